//! Check command: print the resolved configuration.

use pod_config::settings::serialize_pod_toml;
use pod_config::{ConfigSource, PodConfig};

/// Render the configuration and where each layer came from
pub fn render(config: &PodConfig, sources: &[ConfigSource]) -> anyhow::Result<String> {
    let mut output = String::new();

    for source in sources {
        let line = match source {
            ConfigSource::Defaults => "# defaults".to_string(),
            ConfigSource::File(path) => format!("# file: {}", path),
            ConfigSource::Environment(key) => format!("# env: {}", key),
            ConfigSource::CommandLine(flag) => format!("# flag: --{}", flag),
        };
        output.push_str(&line);
        output.push('\n');
    }

    let mut shown = config.clone();
    if shown.registry.token.is_some() {
        shown.registry.token = Some("<redacted>".to_string());
    }
    output.push_str(&serialize_pod_toml(&shown)?);

    Ok(output)
}

pub fn execute(config: &PodConfig, sources: &[ConfigSource]) -> anyhow::Result<()> {
    print!("{}", render(config, sources)?);
    Ok(())
}
