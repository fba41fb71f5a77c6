//! The async key-value primitive and its in-memory backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::KvResult;

/// Async string-keyed storage backing all local state.
///
/// Values are opaque strings; [`JsonStore`](crate::JsonStore) layers typed
/// JSON access on top. Implementations must be safe to share between tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> KvResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> KvResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> KvResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        (**self).remove(key).await
    }
}

/// In-memory store (for tests and ephemeral sessions).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key is present.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// All keys currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> KvResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_set_get() {
        let store = MemoryStore::new();
        store.set("shop:cart", "[]".to_string()).await.unwrap();

        assert_eq!(store.get("shop:cart").await.unwrap().as_deref(), Some("[]"));
        assert!(store.contains("shop:cart").await);
    }

    #[tokio::test]
    async fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        store.set("a", "1".to_string()).await.unwrap();
        store.remove("a").await.unwrap();
        store.remove("a").await.unwrap();

        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_arc_store_delegates() {
        let inner = Arc::new(MemoryStore::new());
        let shared: Arc<dyn KeyValueStore> = inner.clone();

        shared.set("k", "v".to_string()).await.unwrap();
        assert_eq!(inner.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
