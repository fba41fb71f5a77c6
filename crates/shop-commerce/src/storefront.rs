//! The storefront handle: one key-value store wired into every component.

use std::sync::{Arc, Mutex, PoisonError};

use shop_kv::{JsonStore, KeyValueStore};
use tracing::{debug, info};

use crate::cart::CartStore;
use crate::checkout::{CheckoutOrchestrator, CheckoutState, OrderApi};
use crate::coupon::{CouponEngine, CouponOutcome};
use crate::currency::CurrencyPreference;
use crate::error::{CouponError, StorefrontError};
use crate::keys::StorageKeys;
use crate::money::Currency;
use crate::pricing::CartTotals;

/// Owns the cart, coupon and currency state of one device.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Storefront {
    store: JsonStore,
    keys: StorageKeys,
    cart: Arc<CartStore>,
    coupons: Arc<CouponEngine>,
    currency: Arc<CurrencyPreference>,
    checkout_state: Arc<Mutex<CheckoutState>>,
}

impl Storefront {
    /// Wire components over `backend` without loading anything.
    pub fn new(backend: impl KeyValueStore + 'static, keys: StorageKeys, default_currency: Currency) -> Self {
        Self::with_store(JsonStore::new(backend), keys, default_currency)
    }

    /// Wire components over an existing typed store.
    pub fn with_store(store: JsonStore, keys: StorageKeys, default_currency: Currency) -> Self {
        let coupons = Arc::new(CouponEngine::new(store.clone(), keys.coupon()));
        let cart = Arc::new(CartStore::new(store.clone(), keys.cart(), coupons.clone()));
        let currency = Arc::new(CurrencyPreference::new(
            store.clone(),
            keys.currency(),
            default_currency,
        ));
        Self {
            store,
            keys,
            cart,
            coupons,
            currency,
            checkout_state: Arc::default(),
        }
    }

    /// Wire components and restore persisted state.
    pub async fn open(
        backend: impl KeyValueStore + 'static,
        keys: StorageKeys,
        default_currency: Currency,
    ) -> Result<Self, StorefrontError> {
        let storefront = Self::new(backend, keys, default_currency);
        storefront.load().await?;
        Ok(storefront)
    }

    /// Restore cart, coupon and currency from the store.
    pub async fn load(&self) -> Result<(), StorefrontError> {
        let cart = self.cart.load().await?;
        let mut coupon = self.coupons.load().await?;
        if cart.is_empty() && coupon.is_some() {
            debug!("Dropping coupon left over from an emptied cart");
            self.coupons.remove().await?;
            coupon = None;
        }
        let currency = self.currency.load().await?;
        info!(
            namespace = self.keys.namespace(),
            items = cart.item_count(),
            coupon = coupon.as_ref().map(|c| c.code.as_str()).unwrap_or(""),
            currency = %currency,
            "Storefront state loaded"
        );
        Ok(())
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn coupons(&self) -> &Arc<CouponEngine> {
        &self.coupons
    }

    pub fn currency(&self) -> &Arc<CurrencyPreference> {
        &self.currency
    }

    /// Totals of the committed cart with the active coupon.
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.cart.snapshot(), &self.coupons, self.currency.get())
    }

    /// Apply a coupon against the current cart subtotal.
    ///
    /// Holds the cart's lock so no cart mutation lands between reading the
    /// subtotal and pricing the coupon.
    pub async fn apply_coupon(&self, code: &str) -> Result<CouponOutcome, CouponError> {
        let _cart_guard = self.store.lock(self.cart.key()).await;
        self.coupons.apply(code, self.cart.total()).await
    }

    /// Remove the active coupon.
    pub async fn remove_coupon(&self) -> Result<(), CouponError> {
        self.coupons.remove().await
    }

    /// State of the most recent checkout attempt on this storefront.
    pub fn checkout_state(&self) -> CheckoutState {
        *self.checkout_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A checkout orchestrator bound to `api`.
    ///
    /// Every orchestrator handed out here shares one state cell, so at most
    /// one order is in flight per storefront.
    pub fn checkout(&self, api: Arc<dyn OrderApi>) -> CheckoutOrchestrator {
        CheckoutOrchestrator::with_state(
            self.cart.clone(),
            self.coupons.clone(),
            self.currency.clone(),
            api,
            self.checkout_state.clone(),
        )
    }
}
