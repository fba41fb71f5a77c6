//! Cart & checkout state engine for the storefront.
//!
//! - **Cart**: the persisted cart store with synchronous snapshot reads
//! - **Coupon**: the closed coupon rule table and the active-coupon engine
//! - **Currency**: the global currency preference
//! - **Checkout**: payment validation, the order API seam and the checkout
//!   state machine
//! - **Storefront**: one handle wiring all of the above over a key-value store
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_commerce::prelude::*;
//! use shop_kv::FileStore;
//!
//! let storefront = Storefront::open(
//!     FileStore::open(".shop").await?,
//!     StorageKeys::default(),
//!     Currency::BRL,
//! )
//! .await?;
//!
//! storefront.cart().add_item(&product).await?;
//! storefront.apply_coupon("PROMO10").await?;
//! println!("Total: {}", storefront.totals().total);
//!
//! let checkout = storefront.checkout(api);
//! let order = checkout.submit(&PaymentInput::Pix).await?;
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod currency;
pub mod keys;
pub mod pricing;
pub mod storefront;

pub use error::{
    CardField, CartError, CheckoutError, CouponError, OrderApiError, StorefrontError,
    ValidationError,
};
pub use ids::{OrderId, ProductId};
pub use money::{Amount, Currency, Money};
pub use storefront::Storefront;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{
        CardField, CartError, CheckoutError, CouponError, OrderApiError, StorefrontError,
        ValidationError,
    };
    pub use crate::ids::{OrderId, ProductId};
    pub use crate::money::{Amount, Currency, Money};

    pub use crate::cart::{Cart, CartLine, CartStore, MAX_QUANTITY_PER_ITEM};
    pub use crate::catalog::Product;
    pub use crate::checkout::{
        CardInput, CheckoutOrchestrator, CheckoutState, OrderApi, OrderConfirmation,
        OrderItem, OrderRequest, PaymentInput, PaymentMethod,
    };
    pub use crate::coupon::{AppliedCoupon, CouponEngine, CouponOutcome};
    pub use crate::currency::CurrencyPreference;
    pub use crate::keys::StorageKeys;
    pub use crate::pricing::CartTotals;
    pub use crate::storefront::Storefront;
}
