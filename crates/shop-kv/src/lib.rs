//! Async key-value persistence adapter for the storefront engine.
//!
//! Every piece of local state (cart, applied coupon, currency preference) is
//! stored as a JSON document under a string key. This crate provides:
//!
//! - [`KeyValueStore`] - the async get/set/remove primitive, with an
//!   in-memory ([`MemoryStore`]) and a file-backed ([`FileStore`]) backend
//! - [`JsonStore`] - typed JSON access on top of any backend
//! - [`KeyLocks`] - per-key async locks so read-modify-write cycles on the
//!   same key never interleave
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_kv::{JsonStore, MemoryStore};
//!
//! let store = JsonStore::new(MemoryStore::new());
//!
//! let _guard = store.lock("shop:cart").await;
//! let lines: Option<Vec<CartLine>> = store.get("shop:cart").await?;
//! store.set("shop:cart", &lines.unwrap_or_default()).await?;
//! ```

mod error;
mod file;
mod json;
mod locks;
mod store;

pub use error::{KvError, KvResult};
pub use file::FileStore;
pub use json::JsonStore;
pub use locks::KeyLocks;
pub use store::{KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, JsonStore, KeyLocks, KeyValueStore, KvError, MemoryStore};
}

/// Helper to build storage keys with namespacing.
///
/// # Example
///
/// ```
/// let key = shop_kv::kv_key!("shop", "cart");
/// assert_eq!(key, "shop:cart");
/// ```
#[macro_export]
macro_rules! kv_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
