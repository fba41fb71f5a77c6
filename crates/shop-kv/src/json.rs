//! Typed JSON access over any key-value backend.

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::OwnedMutexGuard;

use crate::{KeyLocks, KeyValueStore, KvResult};

/// Key-value store wrapper with automatic JSON serialization.
///
/// Cloning is cheap; clones share the backend and the lock table, so a
/// lock taken through one clone excludes writers using another.
#[derive(Clone)]
pub struct JsonStore {
    backend: Arc<dyn KeyValueStore>,
    locks: Arc<KeyLocks>,
}

impl JsonStore {
    /// Wrap a backend.
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Wrap an already shared backend.
    pub fn from_arc(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            locks: Arc::new(KeyLocks::new()),
        }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Get a value, or `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let coupon: Option<AppliedCoupon> = store.get("shop:coupon").await?;
    /// ```
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw).await
    }

    /// Delete a value.
    pub async fn delete(&self, key: &str) -> KvResult<()> {
        self.backend.remove(key).await
    }

    /// Take the write lock for `key`.
    ///
    /// Callers doing their own read-modify-write hold the guard across the
    /// read and the write.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(key).await
    }
}

impl fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore")
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let store = JsonStore::new(MemoryStore::new());
        store.set("counter", &Counter { hits: 3 }).await.unwrap();

        let value: Option<Counter> = store.get("counter").await.unwrap();
        assert_eq!(value, Some(Counter { hits: 3 }));

        store.delete("counter").await.unwrap();
        assert_eq!(store.get::<Counter>("counter").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("counter", "not json".to_string()).await.unwrap();
        let store = JsonStore::from_arc(backend);

        let result = store.get::<Counter>("counter").await;
        assert!(matches!(result, Err(crate::KvError::SerializeError(_))));
    }

    #[tokio::test]
    async fn test_locked_read_modify_write_does_not_lose_writes() {
        let store = JsonStore::new(MemoryStore::new());

        let updates = (0..50).map(|_| {
            let store = store.clone();
            async move {
                let _guard = store.lock("counter").await;
                let mut counter: Counter = store.get("counter").await.unwrap().unwrap_or_default();
                tokio::task::yield_now().await;
                counter.hits += 1;
                store.set("counter", &counter).await.unwrap();
            }
        });
        futures::future::join_all(updates).await;

        let value: Counter = store.get("counter").await.unwrap().unwrap();
        assert_eq!(value.hits, 50);
    }
}
