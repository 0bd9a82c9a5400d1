//! Filesystem cache store
//!
//! Serves manifests from a directory laid out like the bucket:
//! `<root>/<package>/index.json`.

use std::io::ErrorKind;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use pod_core::error::{PodError, PodResult};
use pod_core::utils::safe_join;
use crate::{CacheLookup, CacheStore};

/// Cache store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root_path: Utf8PathBuf,
}

impl FsStore {
    /// Create a store reading from `root_path`
    pub fn new<P: AsRef<Utf8Path>>(root_path: P) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
        }
    }

    /// Get the root path of the store
    pub fn root_path(&self) -> &Utf8Path {
        &self.root_path
    }

    /// Write an object, creating parent directories
    ///
    /// Used to seed a local cache; the request path never writes.
    pub async fn put(&self, key: &str, content: &[u8]) -> PodResult<()> {
        let path = safe_join(self.root_path.as_std_path(), key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PodError::io(format!("Failed to create {}", parent.display()), e))?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| PodError::io(format!("Failed to write {}", path.display()), e))
    }
}

#[async_trait]
impl CacheStore for FsStore {
    async fn get(&self, key: &str) -> CacheLookup {
        let path = match safe_join(self.root_path.as_std_path(), key) {
            Ok(path) => path,
            Err(e) => return CacheLookup::Failure(e),
        };
        debug!("Reading cache object {}", path.display());

        match tokio::fs::read(&path).await {
            Ok(content) => CacheLookup::Found(content),
            Err(e) if e.kind() == ErrorKind::NotFound => CacheLookup::NotFound,
            Err(e) => CacheLookup::Failure(PodError::storage_with(e.to_string(), e)),
        }
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FsStore {
        FsStore::new(Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap())
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.put("@types/node/index.json", b"{}").await.unwrap();
        assert!(dir.path().join("@types/node/index.json").exists());

        match store.get("@types/node/index.json").await {
            CacheLookup::Found(content) => assert_eq!(content, b"{}"),
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.get("foo-bar-package/index.json").await.is_not_found());
    }

    #[tokio::test]
    async fn test_traversal_is_failure() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(matches!(
            store.get("../../etc/passwd").await,
            CacheLookup::Failure(_)
        ));
        assert!(store.put("../escape/index.json", b"{}").await.is_err());
    }

    #[tokio::test]
    async fn test_directory_read_is_failure() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(dir.path().join("pkg/index.json")).unwrap();

        assert!(matches!(
            store.get("pkg/index.json").await,
            CacheLookup::Failure(PodError::Storage { .. })
        ));
    }
}
