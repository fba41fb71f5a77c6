//! Coupon engine: validates codes and persists the active coupon.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use shop_kv::{JsonStore, KvError};
use tracing::{debug, warn};

use crate::coupon::rules::{find_rule, normalize_code};
use crate::error::CouponError;
use crate::money::Amount;

/// The coupon currently applied to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    /// Normalized code.
    pub code: String,
    /// Discount resolved against the subtotal at the last (re)pricing.
    pub discount_amount: Amount,
}

/// Result of applying a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponOutcome {
    /// The code matched a rule and is now active.
    Applied(AppliedCoupon),
    /// The code is unknown; any previous coupon was cleared.
    Invalid {
        /// The normalized code that was rejected.
        code: String,
    },
}

impl CouponOutcome {
    /// Check if the code was accepted.
    pub fn is_applied(&self) -> bool {
        matches!(self, CouponOutcome::Applied(_))
    }
}

/// Holds at most one active coupon, persisted under its own key.
///
/// Writes are serialized through the store's per-key lock and the in-memory
/// copy only changes after the write succeeds.
#[derive(Debug)]
pub struct CouponEngine {
    store: JsonStore,
    key: String,
    active: RwLock<Option<AppliedCoupon>>,
}

impl CouponEngine {
    /// Create an engine with no active coupon. Call [`load`](Self::load) to
    /// restore a persisted one.
    pub fn new(store: JsonStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            active: RwLock::new(None),
        }
    }

    /// Storage key of the coupon record.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Restore the persisted coupon without re-validating it.
    ///
    /// A corrupt record is logged and treated as absent.
    pub async fn load(&self) -> Result<Option<AppliedCoupon>, CouponError> {
        let _guard = self.store.lock(&self.key).await;
        let coupon = match self.store.get::<AppliedCoupon>(&self.key).await {
            Ok(coupon) => coupon,
            Err(KvError::SerializeError(e)) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable coupon record");
                None
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load coupon");
                return Err(e.into());
            }
        };
        self.commit(coupon.clone());
        Ok(coupon)
    }

    /// Apply a code against the current subtotal.
    ///
    /// An unknown code clears any previously applied coupon.
    pub async fn apply(&self, code: &str, subtotal: Amount) -> Result<CouponOutcome, CouponError> {
        let _guard = self.store.lock(&self.key).await;

        let Some(rule) = find_rule(code) else {
            let code = normalize_code(code);
            self.delete_record().await?;
            self.commit(None);
            debug!(code = %code, "Rejected coupon code");
            return Ok(CouponOutcome::Invalid { code });
        };

        let coupon = AppliedCoupon {
            code: rule.code.to_string(),
            discount_amount: rule.value.calculate(subtotal),
        };
        self.write_record(&coupon).await?;
        self.commit(Some(coupon.clone()));
        debug!(code = %coupon.code, discount = %coupon.discount_amount, "Applied coupon");
        Ok(CouponOutcome::Applied(coupon))
    }

    /// Remove the active coupon. The discount goes back to zero.
    pub async fn remove(&self) -> Result<(), CouponError> {
        let _guard = self.store.lock(&self.key).await;
        self.delete_record().await?;
        self.commit(None);
        Ok(())
    }

    /// Re-price the active coupon for a changed subtotal.
    ///
    /// Returns the coupon as now stored, `None` if there is none.
    pub async fn refresh(&self, subtotal: Amount) -> Result<Option<AppliedCoupon>, CouponError> {
        let _guard = self.store.lock(&self.key).await;

        let Some(current) = self.active() else {
            return Ok(None);
        };

        let discount_amount = match find_rule(&current.code) {
            Some(rule) => rule.value.calculate(subtotal),
            None => current.discount_amount.min(subtotal).max(Amount::ZERO),
        };
        if discount_amount == current.discount_amount {
            return Ok(Some(current));
        }

        let coupon = AppliedCoupon {
            code: current.code,
            discount_amount,
        };
        self.write_record(&coupon).await?;
        self.commit(Some(coupon.clone()));
        debug!(code = %coupon.code, discount = %coupon.discount_amount, "Re-priced coupon");
        Ok(Some(coupon))
    }

    /// The active coupon, if any.
    pub fn active(&self) -> Option<AppliedCoupon> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Code of the active coupon.
    pub fn code(&self) -> Option<String> {
        self.active().map(|c| c.code)
    }

    /// Current discount, clamped to `subtotal`.
    pub fn discount_for(&self, subtotal: Amount) -> Amount {
        self.active()
            .map(|c| c.discount_amount.min(subtotal).max(Amount::ZERO))
            .unwrap_or(Amount::ZERO)
    }

    async fn write_record(&self, coupon: &AppliedCoupon) -> Result<(), CouponError> {
        self.store.set(&self.key, coupon).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to persist coupon");
            CouponError::from(e)
        })
    }

    async fn delete_record(&self) -> Result<(), CouponError> {
        self.store.delete(&self.key).await.map_err(|e| {
            warn!(key = %self.key, error = %e, "Failed to delete coupon");
            CouponError::from(e)
        })
    }

    fn commit(&self, coupon: Option<AppliedCoupon>) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = coupon;
    }
}
