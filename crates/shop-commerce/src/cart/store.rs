//! Persisted cart store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use shop_kv::{JsonStore, KvError};
use tracing::{debug, warn};

use crate::cart::Cart;
use crate::catalog::Product;
use crate::coupon::CouponEngine;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::Amount;

/// The single owner of cart mutation.
///
/// Every mutation takes the cart key's lock, applies the change to a copy of
/// the committed snapshot, persists the copy and only then swaps it in. Reads
/// are synchronous and always see the last committed cart.
///
/// After a successful mutation the active coupon is re-priced against the
/// new subtotal, or removed when the cart became empty.
#[derive(Debug)]
pub struct CartStore {
    store: JsonStore,
    key: String,
    snapshot: RwLock<Arc<Cart>>,
    needs_resync: AtomicBool,
    coupons: Arc<CouponEngine>,
}

impl CartStore {
    /// Create a store with an empty snapshot. Call [`load`](Self::load) to
    /// restore the persisted cart.
    pub fn new(store: JsonStore, key: impl Into<String>, coupons: Arc<CouponEngine>) -> Self {
        Self {
            store,
            key: key.into(),
            snapshot: RwLock::new(Arc::new(Cart::new())),
            needs_resync: AtomicBool::new(false),
            coupons,
        }
    }

    /// Storage key of the cart record.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The coupon engine this cart keeps in step.
    pub fn coupons(&self) -> &Arc<CouponEngine> {
        &self.coupons
    }

    /// Restore the persisted cart. A missing record is an empty cart.
    ///
    /// A corrupt record is logged and replaced by an empty cart. If the read
    /// itself fails the store keeps its snapshot and reloads before the next
    /// mutation.
    pub async fn load(&self) -> Result<Arc<Cart>, CartError> {
        let _guard = self.store.lock(&self.key).await;
        self.reload_locked().await
    }

    /// Add one unit of `product`. Returns the line's new quantity.
    pub async fn add_item(&self, product: &Product) -> Result<u32, CartError> {
        let quantity = self.mutate("add_item", |cart| cart.add(product)).await?;
        debug!(product_id = %product.id, quantity, "Added item to cart");
        Ok(quantity)
    }

    /// Add several products in one write. Repeats count once each.
    ///
    /// Either every product is added or none is. Returns the number of
    /// products processed.
    pub async fn add_multiple(&self, products: &[Product]) -> Result<usize, CartError> {
        if products.is_empty() {
            return Ok(0);
        }
        self.mutate("add_multiple", |cart| {
            for product in products {
                cart.add(product)?;
            }
            Ok(products.len())
        })
        .await
    }

    /// Remove a product's line. Removing an absent product succeeds and
    /// returns `false`.
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<bool, CartError> {
        self.mutate("remove_item", |cart| Ok(cart.remove(product_id)))
            .await
    }

    /// Set a line's quantity; below 1 removes it.
    ///
    /// Fails with [`CartError::ItemNotInCart`] when setting a positive
    /// quantity on an absent product. Returns the resulting quantity.
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<u32, CartError> {
        let quantity = self
            .mutate("set_quantity", |cart| cart.set_quantity(product_id, quantity))
            .await?;
        debug!(product_id = %product_id, quantity, "Set cart quantity");
        Ok(quantity)
    }

    /// Add one to an existing line.
    pub async fn increment(&self, product_id: &ProductId) -> Result<u32, CartError> {
        self.step(product_id, 1).await
    }

    /// Take one from an existing line; a line at 1 is removed.
    pub async fn decrement(&self, product_id: &ProductId) -> Result<u32, CartError> {
        self.step(product_id, -1).await
    }

    async fn step(&self, product_id: &ProductId, delta: i64) -> Result<u32, CartError> {
        let op = if delta > 0 { "increment" } else { "decrement" };
        let quantity = self
            .mutate(op, |cart| {
                let current = cart
                    .line(product_id)
                    .map(|l| i64::from(l.quantity))
                    .ok_or_else(|| CartError::ItemNotInCart(product_id.clone()))?;
                cart.set_quantity(product_id, current + delta)
            })
            .await?;
        debug!(product_id = %product_id, quantity, op, "Stepped cart quantity");
        Ok(quantity)
    }

    /// Empty the cart, delete its record and remove the coupon.
    ///
    /// Fails with [`CartError::Coupon`] if the cart was emptied but the
    /// coupon record could not be deleted.
    pub async fn clear(&self) -> Result<(), CartError> {
        let _guard = self.store.lock(&self.key).await;

        self.store.delete(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to delete cart");
            CartError::from(e)
        })?;
        self.commit(Cart::new());
        self.needs_resync.store(false, Ordering::SeqCst);
        debug!(key = %self.key, "Cleared cart");

        self.coupons.remove().await.map_err(|e| {
            warn!(error = %e, "Cart cleared but coupon could not be removed");
            CartError::from(e)
        })
    }

    /// `Σ unit_price × quantity` of the committed cart.
    pub fn total(&self) -> Amount {
        self.snapshot().subtotal()
    }

    /// Sum of quantities in the committed cart.
    pub fn count(&self) -> u64 {
        self.snapshot().item_count()
    }

    /// Check if a product has a line in the committed cart.
    pub fn is_in_cart(&self, product_id: &ProductId) -> bool {
        self.snapshot().contains(product_id)
    }

    /// Quantity of a product in the committed cart, 0 if absent.
    pub fn quantity(&self, product_id: &ProductId) -> u32 {
        self.snapshot().quantity(product_id)
    }

    /// The committed cart.
    pub fn snapshot(&self) -> Arc<Cart> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn mutate<R, F>(&self, op: &'static str, f: F) -> Result<R, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<R, CartError>,
    {
        let _guard = self.store.lock(&self.key).await;

        if self.needs_resync.load(Ordering::SeqCst) {
            self.reload_locked().await?;
        }

        let current = self.snapshot();
        let mut next = Cart::clone(&current);
        let result = f(&mut next)?;

        if next == *current {
            return Ok(result);
        }
        next.try_subtotal()?;

        if let Err(e) = self.store.set(&self.key, &next).await {
            warn!(key = %self.key, op, error = %e, "Failed to persist cart");
            return Err(e.into());
        }

        let subtotal = next.subtotal();
        let empty = next.is_empty();
        let items = next.item_count();
        self.commit(next);
        debug!(key = %self.key, op, items, subtotal = %subtotal, "Committed cart mutation");

        self.reconcile_coupon(empty, subtotal).await;
        Ok(result)
    }

    async fn reconcile_coupon(&self, empty: bool, subtotal: Amount) {
        let result = if empty {
            self.coupons.remove().await
        } else {
            self.coupons.refresh(subtotal).await.map(|_| ())
        };
        if let Err(e) = result {
            warn!(error = %e, "Cart committed but coupon could not be updated");
        }
    }

    async fn reload_locked(&self) -> Result<Arc<Cart>, CartError> {
        let cart = match self.store.get::<Cart>(&self.key).await {
            Ok(Some(cart)) => Cart::from_lines(cart.lines().iter().cloned()),
            Ok(None) => Cart::new(),
            Err(KvError::SerializeError(e)) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable cart record");
                Cart::new()
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load cart");
                self.needs_resync.store(true, Ordering::SeqCst);
                return Err(e.into());
            }
        };
        self.needs_resync.store(false, Ordering::SeqCst);
        Ok(self.commit(cart))
    }

    fn commit(&self, cart: Cart) -> Arc<Cart> {
        let cart = Arc::new(cart);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = cart.clone();
        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_kv::{KeyValueStore, MemoryStore};

    fn setup() -> (Arc<CartStore>, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let store = JsonStore::from_arc(backend.clone());
        let coupons = Arc::new(CouponEngine::new(store.clone(), "shop:coupon"));
        (Arc::new(CartStore::new(store, "shop:cart", coupons)), backend)
    }

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, id.to_uppercase(), Amount::from_cents(cents))
    }

    #[tokio::test]
    async fn test_add_persists_and_commits() {
        let (cart, backend) = setup();
        let tee = product("tee", 4990);

        assert_eq!(cart.add_item(&tee).await.unwrap(), 1);
        assert_eq!(cart.add_item(&tee).await.unwrap(), 2);

        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total().cents(), 9980);
        assert!(cart.is_in_cart(&tee.id));
        assert!(backend.contains("shop:cart").await);
    }

    #[tokio::test]
    async fn test_load_restores_persisted_cart() {
        let (cart, backend) = setup();
        cart.add_item(&product("tee", 4990)).await.unwrap();

        let store = JsonStore::from_arc(backend.clone());
        let coupons = Arc::new(CouponEngine::new(store.clone(), "shop:coupon"));
        let reopened = CartStore::new(store, "shop:cart", coupons);
        assert_eq!(reopened.count(), 0);

        let loaded = reopened.load().await.unwrap();
        assert_eq!(loaded.item_count(), 1);
        assert_eq!(reopened.total().cents(), 4990);
    }

    #[tokio::test]
    async fn test_load_corrupt_record_is_empty() {
        let (cart, backend) = setup();
        backend.set("shop:cart", "[{".to_string()).await.unwrap();

        let loaded = cart.load().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_negatively_priced_lines() {
        let (cart, backend) = setup();
        let tampered = serde_json::json!([
            { "productId": "bad", "title": "Bad", "unitPrice": -50.0, "quantity": 2 },
            { "productId": "tee", "title": "Tee", "unitPrice": 10.0, "quantity": 1 }
        ]);
        backend.set("shop:cart", tampered.to_string()).await.unwrap();

        let loaded = cart.load().await.unwrap();
        assert_eq!(loaded.unique_item_count(), 1);
        assert!(!cart.is_in_cart(&ProductId::new("bad")));
        assert_eq!(cart.total().cents(), 1000);
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes() {
        let (cart, _) = setup();
        let tee = product("tee", 100);
        cart.add_item(&tee).await.unwrap();

        assert_eq!(cart.decrement(&tee.id).await.unwrap(), 0);
        assert!(!cart.is_in_cart(&tee.id));
    }

    #[tokio::test]
    async fn test_step_absent_fails_without_mutation() {
        let (cart, _) = setup();
        cart.add_item(&product("tee", 100)).await.unwrap();
        let before = cart.snapshot();

        let ghost = ProductId::new("ghost");
        assert!(matches!(cart.decrement(&ghost).await, Err(CartError::ItemNotInCart(_))));
        assert!(matches!(cart.increment(&ghost).await, Err(CartError::ItemNotInCart(_))));
        assert_eq!(*cart.snapshot(), *before);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let (cart, _) = setup();
        assert!(!cart.remove_item(&ProductId::new("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_multiple_single_batch() {
        let (cart, _) = setup();
        let tee = product("tee", 100);
        let mug = product("mug", 200);

        let added = cart
            .add_multiple(&[tee.clone(), mug.clone(), tee.clone()])
            .await
            .unwrap();
        assert_eq!(added, 3);
        assert_eq!(cart.quantity(&tee.id), 2);
        assert_eq!(cart.total().cents(), 400);
    }

    #[tokio::test]
    async fn test_add_multiple_is_all_or_nothing() {
        let (cart, _) = setup();
        let result = cart
            .add_multiple(&[product("tee", 100), product("bad", -5)])
            .await;

        assert!(matches!(result, Err(CartError::InvalidPrice(_))));
        assert_eq!(cart.count(), 0);
    }

    #[tokio::test]
    async fn test_emptying_cart_removes_coupon() {
        let (cart, _) = setup();
        let tee = product("tee", 10000);
        cart.add_item(&tee).await.unwrap();
        cart.coupons().apply("PROMO10", cart.total()).await.unwrap();

        cart.remove_item(&tee.id).await.unwrap();
        assert!(cart.coupons().active().is_none());
    }

    #[tokio::test]
    async fn test_mutation_reprices_coupon() {
        let (cart, _) = setup();
        let tee = product("tee", 10000);
        cart.add_item(&tee).await.unwrap();
        cart.coupons().apply("PROMO10", cart.total()).await.unwrap();

        cart.increment(&tee.id).await.unwrap();
        assert_eq!(cart.coupons().discount_for(cart.total()).cents(), 2000);
    }

    #[tokio::test]
    async fn test_clear_deletes_record_and_coupon() {
        let (cart, backend) = setup();
        cart.add_item(&product("tee", 10000)).await.unwrap();
        cart.coupons().apply("FRETEGRATIS", cart.total()).await.unwrap();

        cart.clear().await.unwrap();
        assert_eq!(cart.count(), 0);
        assert!(!backend.contains("shop:cart").await);
        assert!(!backend.contains("shop:coupon").await);
    }

    #[tokio::test]
    async fn test_concurrent_increments_do_not_lose_updates() {
        let (cart, _) = setup();
        let tee = product("tee", 100);
        cart.add_item(&tee).await.unwrap();

        let tasks = (0..20).map(|_| {
            let cart = cart.clone();
            let id = tee.id.clone();
            tokio::spawn(async move { cart.increment(&id).await.unwrap() })
        });
        for task in futures::future::join_all(tasks).await {
            task.unwrap();
        }

        assert_eq!(cart.quantity(&tee.id), 21);
    }
}
