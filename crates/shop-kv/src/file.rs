//! File-backed store: one file per key in a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{KeyValueStore, KvError, KvResult};

/// Durable store keeping each key in its own file.
///
/// Writes go to a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> KvResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| KvError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> KvResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        tracing::trace!(key, path = %path.display(), "record written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a key to a filename, escaping anything outside `[A-Za-z0-9_-]`.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("shop:cart"), "shop%3Acart");
        assert_eq!(encode_key("shop_cart"), "shop_cart");
        assert_ne!(encode_key("a/b"), encode_key("a_b"));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).await.unwrap();

        store.set("shop:cart", r#"[{"productId":"1"}]"#.to_string()).await.unwrap();
        let value = store.get("shop:cart").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"productId":"1"}]"#));

        // Survives reopening the directory
        let reopened = FileStore::open(store.dir()).await.unwrap();
        assert!(reopened.get("shop:cart").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_file_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.set("shop:coupon", "{}".to_string()).await.unwrap();
        store.remove("shop:coupon").await.unwrap();
        assert_eq!(store.get("shop:coupon").await.unwrap(), None);

        // Removing again is not an error
        store.remove("shop:coupon").await.unwrap();
    }
}
