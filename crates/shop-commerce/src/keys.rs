//! Storage key layout.

use shop_kv::kv_key;

/// Default namespace for all storefront records.
pub const DEFAULT_NAMESPACE: &str = "shop";

/// Keys of the persisted records, all under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    namespace: String,
}

impl StorageKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<namespace>:cart`
    pub fn cart(&self) -> String {
        kv_key!(self.namespace.as_str(), "cart")
    }

    /// `<namespace>:coupon`
    pub fn coupon(&self) -> String {
        kv_key!(self.namespace.as_str(), "coupon")
    }

    /// `<namespace>:currency`
    pub fn currency(&self) -> String {
        kv_key!(self.namespace.as_str(), "currency")
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
