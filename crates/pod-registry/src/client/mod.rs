//! HTTP client for npm-compatible registries

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;

use pod_config::RegistrySection;
use pod_core::error::{PodError, PodResult};
use pod_core::utils::encode_package_name;
use crate::{UpstreamError, UpstreamRegistry};

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// npm registry client
///
/// Makes exactly one request per lookup; retries are left to the caller.
#[derive(Debug, Clone)]
pub struct NpmClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
}

impl NpmClient {
    /// Create registry client with default settings
    pub fn new() -> PodResult<Self> {
        Self::with_config(None, Duration::from_secs(30))
    }

    /// Create registry client with authentication
    pub fn with_auth(auth: AuthConfig) -> PodResult<Self> {
        Self::with_config(Some(auth), Duration::from_secs(30))
    }

    /// Create registry client from the `[registry]` config section
    pub fn from_section(section: &RegistrySection) -> PodResult<Self> {
        let auth = section.token.clone().map(|token| AuthConfig {
            token: Some(token),
            ..AuthConfig::default()
        });
        Self::with_config(auth, Duration::from_secs(section.timeout_secs))
    }

    /// Create registry client with custom configuration
    fn with_config(auth: Option<AuthConfig>, timeout: Duration) -> PodResult<Self> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(timeout)
            .gzip(true)
            .user_agent(concat!("pod/", env!("CARGO_PKG_VERSION")));

        if let Some(value) = auth.and_then(authorization_value) {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                value.parse().map_err(|e| PodError::Network {
                    message: format!("Invalid registry credentials: {}", e),
                    source: Some(Box::new(e)),
                })?,
            );
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|e| PodError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self { client })
    }
}

/// Authorization header value for the configured credentials
fn authorization_value(auth: AuthConfig) -> Option<String> {
    if let Some(token) = auth.token {
        return Some(format!("Bearer {}", token));
    }

    let (username, password) = (auth.username?, auth.password?);
    use base64::{Engine as _, engine::general_purpose};
    let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    Some(format!("Basic {}", encoded))
}

/// Error text a registry put in its JSON error body, if any
fn registry_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message", "reason"]
        .iter()
        .find_map(|field| value.get(*field)?.as_str().map(str::to_string))
        .filter(|message| !message.is_empty())
}

#[async_trait]
impl UpstreamRegistry for NpmClient {
    async fn fetch_package(
        &self,
        registry: &str,
        package_name: &str,
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!(
            "{}/{}",
            registry.trim_end_matches('/'),
            encode_package_name(package_name)
        );
        debug!("Fetching upstream metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| UpstreamError::new(500, format!("Failed to reach registry: {}", e)))?;

        match response.status() {
            status if status.is_success() => response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| UpstreamError::new(500, format!("Failed to parse registry response: {}", e))),
            StatusCode::NOT_FOUND => Err(UpstreamError::new(
                404,
                format!("Package '{}' not found", package_name),
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                let message = registry_message(&body)
                    .unwrap_or_else(|| format!("Registry returned status {}", status.as_u16()));
                Err(UpstreamError::new(status.as_u16(), message))
            }
        }
    }
}
