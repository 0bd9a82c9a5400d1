//! In-memory cache store
//!
//! Backs the `memory` backend (pure proxy mode: every lookup misses unless
//! seeded) and lets tests script store behaviour per key.

use async_trait::async_trait;
use dashmap::DashMap;

use pod_core::error::PodError;
use crate::{CacheLookup, CacheStore};

#[derive(Debug, Clone)]
enum Slot {
    Object(Vec<u8>),
    Failure(String),
}

/// DashMap-backed cache store
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<String, Slot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object under `key`
    pub fn insert(&self, key: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.objects.insert(key.into(), Slot::Object(content.into()));
    }

    /// Make lookups of `key` fail with `message`
    pub fn fail_with(&self, key: impl Into<String>, message: impl Into<String>) {
        self.objects.insert(key.into(), Slot::Failure(message.into()));
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheLookup {
        match self.objects.get(key).map(|slot| slot.value().clone()) {
            Some(Slot::Object(content)) => CacheLookup::Found(content),
            Some(Slot::Failure(message)) => CacheLookup::Failure(PodError::storage(message)),
            None => CacheLookup::NotFound,
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_lookups() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.insert("a/index.json", b"{}".to_vec());
        store.fail_with("b/index.json", "Storage error.");
        assert_eq!(store.len(), 2);

        assert!(store.get("a/index.json").await.is_found());
        assert!(store.get("c/index.json").await.is_not_found());
        match store.get("b/index.json").await {
            CacheLookup::Failure(err) => assert_eq!(err.to_string(), "Storage error."),
            other => panic!("Expected Failure, got {:?}", other),
        }
    }
}
