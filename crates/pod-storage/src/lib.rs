//! Cache store backends for the Pod registry shim
//!
//! A cache store answers one question: what bytes are stored under a key.
//! Lookups never fail with an error value; a missing key and a broken store
//! are distinct variants of [`CacheLookup`].

pub mod s3;
pub mod fs;
pub mod memory;

// Re-export main types
pub use s3::S3Store;
pub use fs::FsStore;
pub use memory::MemoryStore;

use std::sync::Arc;
use async_trait::async_trait;
use pod_config::{StorageBackend, StorageSection};
use pod_core::error::{PodError, PodResult};

/// Outcome of a cache read
#[derive(Debug)]
pub enum CacheLookup {
    /// Object bytes as stored
    Found(Vec<u8>),
    /// No object under the key
    NotFound,
    /// The store could not answer
    Failure(PodError),
}

impl CacheLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, CacheLookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheLookup::NotFound)
    }
}

/// Read-only key-value object store holding published manifests
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the object stored under `key`
    async fn get(&self, key: &str) -> CacheLookup;

    /// Backend name for diagnostics
    fn name(&self) -> &'static str;
}

/// Build the configured cache store
pub fn build_store(section: &StorageSection) -> PodResult<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match section.backend {
        StorageBackend::S3 => {
            let bucket = section.bucket.as_deref().ok_or_else(|| PodError::ConfigValidation {
                field: "storage.bucket".to_string(),
                reason: "the s3 backend requires a bucket".to_string(),
            })?;
            let s3 = match (&section.endpoint, &section.region) {
                (Some(endpoint), _) => S3Store::with_endpoint(endpoint, bucket)?,
                (None, Some(region)) => S3Store::new(bucket, region)?,
                (None, None) => {
                    return Err(PodError::ConfigValidation {
                        field: "storage.region".to_string(),
                        reason: "the s3 backend requires a region or an explicit endpoint".to_string(),
                    })
                }
            };
            Arc::new(s3)
        }
        StorageBackend::Fs => {
            let root = section.root.as_deref().ok_or_else(|| PodError::ConfigValidation {
                field: "storage.root".to_string(),
                reason: "the fs backend requires a root directory".to_string(),
            })?;
            Arc::new(FsStore::new(root))
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    Ok(store)
}
