//! pod.toml configuration parsing and validation

use std::str::FromStr;
use serde::{Deserialize, Serialize};
use pod_core::error::PodError;
use crate::ConfigResult;

/// Default upstream registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Complete Pod configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PodConfig {
    /// Upstream registry consulted on cache miss
    #[serde(default)]
    pub registry: RegistrySection,

    /// Cache store holding published manifests
    #[serde(default)]
    pub storage: StorageSection,

    /// Where failure events are published
    #[serde(default)]
    pub events: EventsSection,

    /// Local HTTP host settings
    #[serde(default)]
    pub server: ServerSection,
}

/// Upstream registry section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Registry base URL
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Bearer token sent to the registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
}

/// Cache store section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// S3-compatible endpoint overriding the AWS virtual-host URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Root directory for the filesystem backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

/// Cache store implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Fs,
    Memory,
}

/// Event publishing section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventsSection {
    /// Topic endpoint receiving error events; tracing only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Local HTTP host section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl FromStr for StorageBackend {
    type Err = PodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "fs" | "file" => Ok(Self::Fs),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(PodError::ConfigValidation {
                field: "storage.backend".to_string(),
                reason: format!("Unknown storage backend '{}'. Expected s3, fs or memory", other),
            }),
        }
    }
}

/// Parse pod.toml content
pub fn parse_pod_toml(content: &str) -> ConfigResult<PodConfig> {
    toml::from_str(content).map_err(|e| PodError::TomlParse {
        message: e.to_string(),
    })
}

/// Serialize configuration back to TOML
pub fn serialize_pod_toml(config: &PodConfig) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| PodError::TomlParse {
        message: format!("Failed to serialize configuration: {}", e),
    })
}

/// Load pod.toml from disk
pub async fn load_from_file(path: &camino::Utf8Path) -> ConfigResult<PodConfig> {
    let content = tokio::fs::read_to_string(path).await
        .map_err(|e| PodError::io(format!("Failed to read {}", path), e))?;

    parse_pod_toml(&content)
        .map_err(|e| match e {
            PodError::TomlParse { message } => PodError::TomlParse {
                message: format!("In file {}: {}", path, message),
            },
            other => other,
        })
}

impl PodConfig {
    /// Validate cross-field requirements
    pub fn validate(&self) -> ConfigResult<()> {
        http_url("registry.url", &self.registry.url)?;

        if self.registry.timeout_secs == 0 {
            return Err(PodError::ConfigValidation {
                field: "registry.timeout-secs".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.bucket.as_deref().map_or(true, str::is_empty) {
                    return Err(PodError::ConfigValidation {
                        field: "storage.bucket".to_string(),
                        reason: "the s3 backend requires a bucket".to_string(),
                    });
                }
                if self.storage.region.is_none() && self.storage.endpoint.is_none() {
                    return Err(PodError::ConfigValidation {
                        field: "storage.region".to_string(),
                        reason: "the s3 backend requires a region or an explicit endpoint".to_string(),
                    });
                }
                if let Some(endpoint) = &self.storage.endpoint {
                    http_url("storage.endpoint", endpoint)?;
                }
            }
            StorageBackend::Fs => {
                if self.storage.root.as_deref().map_or(true, str::is_empty) {
                    return Err(PodError::ConfigValidation {
                        field: "storage.root".to_string(),
                        reason: "the fs backend requires a root directory".to_string(),
                    });
                }
            }
            StorageBackend::Memory => {}
        }

        if let Some(topic) = &self.events.topic {
            http_url("events.topic", topic)?;
        }

        Ok(())
    }
}

/// Parse `value` as an absolute http(s) URL
///
/// Other schemes parse fine (`arn:aws:sns:...`) but cannot be reached over HTTP.
fn http_url(field: &str, value: &str) -> ConfigResult<url::Url> {
    let url = url::Url::parse(value).map_err(|e| PodError::ConfigValidation {
        field: field.to_string(),
        reason: format!("'{}' is not a valid URL: {}", value, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(PodError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{}' uses scheme '{}', expected http or https", value, scheme),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_config() -> PodConfig {
        let mut config = PodConfig::default();
        config.storage.bucket = Some("foo-bucket".to_string());
        config.storage.region = Some("bar-region".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = PodConfig::default();
        assert_eq!(config.registry.url, "https://registry.npmjs.org");
        assert_eq!(config.registry.timeout_secs, 30);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[registry]
url = "https://example.com"
token = "secret"
timeout-secs = 5

[storage]
backend = "s3"
bucket = "foo-bucket"
region = "bar-region"

[events]
topic = "https://events.example.com/topics/pod"
"#;
        let config = parse_pod_toml(content).unwrap();
        assert_eq!(config.registry.url, "https://example.com");
        assert_eq!(config.registry.token.as_deref(), Some("secret"));
        assert_eq!(config.registry.timeout_secs, 5);
        assert_eq!(config.storage.bucket.as_deref(), Some("foo-bucket"));
        assert_eq!(config.events.topic.as_deref(), Some("https://events.example.com/topics/pod"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_pod_toml("").unwrap();
        assert_eq!(config, PodConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let result = parse_pod_toml("[storage\nbucket = 1");
        assert!(matches!(result, Err(PodError::TomlParse { .. })));
    }

    #[test]
    fn test_unknown_backend() {
        let result = parse_pod_toml("[storage]\nbackend = \"ftp\"");
        assert!(result.is_err());
        assert!("ftp".parse::<StorageBackend>().is_err());
        assert_eq!("FS".parse::<StorageBackend>().unwrap(), StorageBackend::Fs);
    }

    #[test]
    fn test_validate_s3_requirements() {
        assert!(s3_config().validate().is_ok());

        let mut config = s3_config();
        config.storage.bucket = None;
        assert!(matches!(
            config.validate(),
            Err(PodError::ConfigValidation { field, .. }) if field == "storage.bucket"
        ));

        let mut config = s3_config();
        config.storage.region = None;
        assert!(config.validate().is_err());
        config.storage.endpoint = Some("http://localhost:9000".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_fs_requirements() {
        let mut config = PodConfig::default();
        config.storage.backend = StorageBackend::Fs;
        assert!(config.validate().is_err());

        config.storage.root = Some("/srv/pod".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_urls() {
        let mut config = s3_config();
        config.registry.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = s3_config();
        config.events.topic = Some("::".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_topic() {
        let mut config = s3_config();
        config.events.topic = Some("arn:aws:sns:us-east-1:123456789012:pod".to_string());

        match config.validate() {
            Err(PodError::ConfigValidation { field, reason }) => {
                assert_eq!(field, "events.topic");
                assert!(reason.contains("scheme 'arn'"));
            },
            other => panic!("expected a validation error, got {:?}", other),
        }

        config.events.topic = Some("http://localhost:9000/topics/pod".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_registry() {
        let mut config = s3_config();
        config.registry.url = "ftp://registry.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_serialization() {
        let config = s3_config();
        let text = serialize_pod_toml(&config).unwrap();
        assert_eq!(parse_pod_toml(&text).unwrap(), config);
    }
}
