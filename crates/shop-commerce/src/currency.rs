//! Global currency preference.

use std::sync::{PoisonError, RwLock};

use shop_kv::{JsonStore, KvError};
use tracing::{debug, warn};

use crate::money::Currency;

/// The currency the shopper browses and orders in.
///
/// Changing it affects later catalog fetches and order submissions only;
/// lines already in the cart keep their snapshotted prices.
#[derive(Debug)]
pub struct CurrencyPreference {
    store: JsonStore,
    key: String,
    current: RwLock<Currency>,
}

impl CurrencyPreference {
    /// Create a preference starting at `initial`.
    pub fn new(store: JsonStore, key: impl Into<String>, initial: Currency) -> Self {
        Self {
            store,
            key: key.into(),
            current: RwLock::new(initial),
        }
    }

    /// Restore the persisted preference, keeping the current value when
    /// nothing usable is stored.
    pub async fn load(&self) -> Result<Currency, KvError> {
        match self.store.get::<Currency>(&self.key).await {
            Ok(Some(currency)) => self.commit(currency),
            Ok(None) => {}
            Err(KvError::SerializeError(e)) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable currency preference");
            }
            Err(e) => return Err(e),
        }
        Ok(self.get())
    }

    /// The current currency.
    pub fn get(&self) -> Currency {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist and switch to `currency`.
    pub async fn set(&self, currency: Currency) -> Result<(), KvError> {
        let _guard = self.store.lock(&self.key).await;
        self.store.set(&self.key, &currency).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to persist currency preference");
            e
        })?;
        self.commit(currency);
        debug!(currency = %currency, "Currency preference changed");
        Ok(())
    }

    fn commit(&self, currency: Currency) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = currency;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_kv::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_defaults_until_set() {
        let pref = CurrencyPreference::new(JsonStore::new(MemoryStore::new()), "shop:currency", Currency::BRL);
        assert_eq!(pref.load().await.unwrap(), Currency::BRL);

        pref.set(Currency::USD).await.unwrap();
        assert_eq!(pref.get(), Currency::USD);
    }

    #[tokio::test]
    async fn test_survives_restart() {
        let backend = Arc::new(MemoryStore::new());
        let pref = CurrencyPreference::new(JsonStore::from_arc(backend.clone()), "shop:currency", Currency::BRL);
        pref.set(Currency::USD).await.unwrap();
        assert_eq!(backend.get("shop:currency").await.unwrap().as_deref(), Some(r#""USD""#));

        let reopened = CurrencyPreference::new(JsonStore::from_arc(backend), "shop:currency", Currency::BRL);
        assert_eq!(reopened.load().await.unwrap(), Currency::USD);
    }

    #[tokio::test]
    async fn test_unknown_stored_value_is_ignored() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("shop:currency", r#""EUR""#.to_string()).await.unwrap();
        let pref = CurrencyPreference::new(JsonStore::from_arc(backend), "shop:currency", Currency::BRL);

        assert_eq!(pref.load().await.unwrap(), Currency::BRL);
    }
}
