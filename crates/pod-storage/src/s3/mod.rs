//! S3-compatible object store reached over plain HTTP
//!
//! Objects are read with an unsigned `GET`; access control is expected to
//! come from the bucket policy or from a signing endpoint in front of it.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use pod_core::error::{PodError, PodResult};
use crate::{CacheLookup, CacheStore};

/// S3 error code for a missing object
const NO_SUCH_KEY: &str = "NoSuchKey";

/// Cache store backed by an S3 bucket
#[derive(Debug, Clone)]
pub struct S3Store {
    /// Underlying HTTP client
    client: Client,
    /// Bucket root URL; object keys are appended as path segments
    base_url: Url,
}

impl S3Store {
    /// Store for an AWS bucket addressed by virtual host
    pub fn new(bucket: &str, region: &str) -> PodResult<Self> {
        let base = format!("https://{}.s3.{}.amazonaws.com", bucket, region);
        Self::from_base(&base)
    }

    /// Store for an S3-compatible endpoint using path-style addressing
    pub fn with_endpoint(endpoint: &str, bucket: &str) -> PodResult<Self> {
        let base = format!("{}/{}", endpoint.trim_end_matches('/'), bucket);
        Self::from_base(&base)
    }

    fn from_base(base: &str) -> PodResult<Self> {
        let base_url = Url::parse(base).map_err(|e| PodError::ConfigValidation {
            field: "storage".to_string(),
            reason: format!("Invalid bucket URL '{}': {}", base, e),
        })?;

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("pod/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PodError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self { client, base_url })
    }

    /// URL of the object stored under `key`
    fn object_url(&self, key: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.split('/'));
        }
        url
    }
}

#[async_trait]
impl CacheStore for S3Store {
    async fn get(&self, key: &str) -> CacheLookup {
        let url = self.object_url(key);
        debug!("Fetching cache object {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return CacheLookup::Failure(PodError::storage_with(
                    format!("Failed to reach cache store: {}", e),
                    e,
                ))
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.bytes().await {
                Ok(bytes) => CacheLookup::Found(bytes.to_vec()),
                Err(e) => CacheLookup::Failure(PodError::storage_with(
                    format!("Failed to read cache object: {}", e),
                    e,
                )),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let code = extract_element(&body, "Code");

        match code.as_deref() {
            Some(NO_SUCH_KEY) => CacheLookup::NotFound,
            None if status == reqwest::StatusCode::NOT_FOUND => CacheLookup::NotFound,
            _ => {
                let message = extract_element(&body, "Message")
                    .or(code)
                    .unwrap_or_else(|| format!("Cache store returned status {}", status.as_u16()));
                CacheLookup::Failure(PodError::storage(message))
            }
        }
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

/// Text of the first `<tag>` element in an S3 XML error document
fn extract_element(body: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    let text = body[start..end].trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests;
