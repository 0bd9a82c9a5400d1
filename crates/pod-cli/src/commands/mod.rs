//! Command implementations and dispatch logic.

use std::collections::HashMap;
use anyhow::Context;
use camino::Utf8PathBuf;
use tracing::{debug, info};

use pod_config::{ConfigLoader, PodConfig};

pub mod check;
pub mod invoke;
pub mod serve;


use crate::{Cli, Commands};

/// Resolve configuration from every layer
pub async fn load_config(
    config_path: Option<Utf8PathBuf>,
    cli_overrides: HashMap<String, String>,
) -> anyhow::Result<(PodConfig, Vec<pod_config::ConfigSource>)> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;

    let (config, sources) = ConfigLoader::new(cwd)
        .with_config_path(config_path)
        .load(&cli_overrides)
        .await
        .context("Failed to load configuration")?;

    debug!("Configuration resolved from {:?}", sources);
    Ok((config, sources))
}

/// Dispatch a command to its handler
pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { bind, registry } => {
            let mut overrides = HashMap::new();
            if let Some(bind) = bind {
                overrides.insert("bind".to_string(), bind);
            }
            if let Some(registry) = registry {
                overrides.insert("registry".to_string(), registry);
            }
            let (config, _) = load_config(cli.config, overrides).await?;
            info!("Serving registry metadata from {}", config.registry.url);
            serve::execute(config).await
        }
        Commands::Invoke { event } => {
            let (config, _) = load_config(cli.config, HashMap::new()).await?;
            invoke::execute(event, &config).await
        }
        Commands::Check => {
            let (config, sources) = load_config(cli.config, HashMap::new()).await?;
            check::execute(&config, &sources)
        }
    }
}
