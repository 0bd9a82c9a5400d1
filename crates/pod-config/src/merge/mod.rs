//! Configuration layering and environment overrides
//!
//! Precedence, lowest to highest: built-in defaults, pod.toml, the host's
//! plain environment names, `POD_*` environment variables, CLI flags.

use std::collections::HashMap;
use camino::Utf8PathBuf;
use pod_core::error::PodError;
use tracing::debug;
use crate::{ConfigResult, settings::{PodConfig, StorageBackend}};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "POD_CONFIG";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Explicit config file, if any
    config_path: Option<Utf8PathBuf>,
    /// Directory searched for pod.toml when no path is given
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Built-in defaults
    Defaults,
    /// pod.toml file
    File(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine(String),
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { config_path: None, cwd }
    }

    /// Use an explicit config file instead of searching for pod.toml
    pub fn with_config_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Load configuration from every layer using the process environment
    pub async fn load(&self, cli_overrides: &HashMap<String, String>) -> ConfigResult<(PodConfig, Vec<ConfigSource>)> {
        let env = ConfigLayering::collect_env_overrides();
        self.load_with_env(&env, cli_overrides).await
    }

    /// Load configuration with an explicit environment map
    pub async fn load_with_env(
        &self,
        env: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<(PodConfig, Vec<ConfigSource>)> {
        let mut sources = vec![ConfigSource::Defaults];

        let file_config = match self.resolve_config_path(env)? {
            Some(path) => {
                debug!("Loading configuration from {}", path);
                let config = crate::settings::load_from_file(&path).await?;
                sources.push(ConfigSource::File(path));
                Some(config)
            }
            None => None,
        };

        let (config, overridden) = ConfigLayering::merge_configs(file_config, env, cli_overrides)?;
        sources.extend(overridden);

        config.validate()?;
        Ok((config, sources))
    }

    /// Find the config file to read, if any
    ///
    /// An explicit path must exist; the implicit `./pod.toml` is optional.
    pub fn resolve_config_path(&self, env: &HashMap<String, String>) -> ConfigResult<Option<Utf8PathBuf>> {
        let explicit = self
            .config_path
            .clone()
            .or_else(|| env.get(CONFIG_ENV).map(Utf8PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(PodError::ConfigValidation {
                    field: "config".to_string(),
                    reason: format!("Config file {} does not exist", path),
                });
            }
            return Ok(Some(path));
        }

        let implicit = self.cwd.join("pod.toml");
        Ok(implicit.exists().then_some(implicit))
    }
}

impl ConfigLayering {
    /// Merge the file layer with environment and CLI overrides
    pub fn merge_configs(
        file_config: Option<PodConfig>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<(PodConfig, Vec<ConfigSource>)> {
        let mut merged = file_config.unwrap_or_default();
        let mut sources = Vec::new();

        Self::apply_env_overrides(&mut merged, env_overrides, &mut sources)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides, &mut sources)?;

        Ok((merged, sources))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut PodConfig,
        overrides: &HashMap<String, String>,
        sources: &mut Vec<ConfigSource>,
    ) -> ConfigResult<()> {
        // Plain names first so POD_* always wins
        const ORDERED: &[&str] = &[
            "registry",
            "bucket",
            "region",
            "logTopic",
            "POD_REGISTRY",
            "POD_REGISTRY_TOKEN",
            "POD_REGISTRY_TIMEOUT",
            "POD_STORAGE_BACKEND",
            "POD_BUCKET",
            "POD_REGION",
            "POD_STORAGE_ENDPOINT",
            "POD_STORAGE_ROOT",
            "POD_LOG_TOPIC",
            "POD_BIND",
        ];

        for key in ORDERED {
            let Some(value) = overrides.get(*key) else {
                continue;
            };
            Self::apply_setting(config, key, value)?;
            sources.push(ConfigSource::Environment(key.to_string()));
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut PodConfig,
        overrides: &HashMap<String, String>,
        sources: &mut Vec<ConfigSource>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            let env_key = match key.as_str() {
                "registry" => "POD_REGISTRY",
                "bind" => "POD_BIND",
                "backend" => "POD_STORAGE_BACKEND",
                "root" => "POD_STORAGE_ROOT",
                _ => {
                    // Unknown CLI override, ignore
                    continue;
                }
            };
            Self::apply_setting(config, env_key, value)?;
            sources.push(ConfigSource::CommandLine(key.clone()));
        }

        Ok(())
    }

    fn apply_setting(config: &mut PodConfig, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "registry" | "POD_REGISTRY" => config.registry.url = value.to_string(),
            "POD_REGISTRY_TOKEN" => config.registry.token = Some(value.to_string()),
            "POD_REGISTRY_TIMEOUT" => {
                config.registry.timeout_secs = value.parse().map_err(|e| PodError::ConfigValidation {
                    field: key.to_string(),
                    reason: format!("Invalid timeout '{}': {}", value, e),
                })?;
            }
            "POD_STORAGE_BACKEND" => config.storage.backend = value.parse::<StorageBackend>()?,
            "bucket" | "POD_BUCKET" => config.storage.bucket = Some(value.to_string()),
            "region" | "POD_REGION" => config.storage.region = Some(value.to_string()),
            "POD_STORAGE_ENDPOINT" => config.storage.endpoint = Some(value.to_string()),
            "POD_STORAGE_ROOT" => config.storage.root = Some(value.to_string()),
            "logTopic" | "POD_LOG_TOPIC" => config.events.topic = Some(value.to_string()),
            "POD_BIND" => config.server.bind = value.to_string(),
            _ => {}
        }
        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        const PLAIN: &[&str] = &["registry", "bucket", "region", "logTopic"];

        std::env::vars()
            .filter(|(key, _)| key.starts_with("POD_") || PLAIN.contains(&key.as_str()))
            .collect()
    }
}
