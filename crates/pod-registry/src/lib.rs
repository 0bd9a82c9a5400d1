//! Upstream npm registry client for the Pod registry shim
//!
//! On a cache miss Pod relays the upstream registry's package document
//! untouched, so lookups return raw JSON rather than a typed manifest.

pub mod client;

// Re-export main types
pub use client::{NpmClient, AuthConfig};

use async_trait::async_trait;
use pod_core::error::PodError;
use thiserror::Error;

/// Failed upstream lookup, carrying the status relayed to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: u16,
    pub message: String,
}

impl UpstreamError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Server-side failure class, the only one worth alerting on
    pub fn is_server_error(&self) -> bool {
        self.status == 500
    }
}

impl From<UpstreamError> for PodError {
    fn from(error: UpstreamError) -> Self {
        PodError::upstream(error.status, error.message)
    }
}

/// Remote package metadata lookup
#[async_trait]
pub trait UpstreamRegistry: Send + Sync {
    /// Fetch the package document for `package_name` from `registry`
    async fn fetch_package(
        &self,
        registry: &str,
        package_name: &str,
    ) -> Result<serde_json::Value, UpstreamError>;
}
