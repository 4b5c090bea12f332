//! In-memory session store backend.
//!
//! Keeps session state in a concurrent map. Nothing survives a restart,
//! which makes this the right backend for tests and for embedding the
//! client in processes that manage their own persistence.

use async_trait::async_trait;
use dashmap::DashMap;

use gambit_store::{KvError, KvStore};

/// In-memory [`KvStore`] backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_store::testing::run_store_conformance_tests;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryKvStore::new();
        run_store_conformance_tests(&store)
            .await
            .expect("memory store should pass conformance tests");
    }

    #[tokio::test]
    async fn len_tracks_entries() {
        let store = MemoryKvStore::new();
        assert!(store.is_empty());
        store.set("authToken", "tok").await.unwrap();
        assert_eq!(store.len(), 1);
        store.remove("authToken").await.unwrap();
        assert!(store.is_empty());
    }
}
