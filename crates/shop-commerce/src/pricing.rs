//! Cart totals as shown at checkout.

use crate::cart::Cart;
use crate::coupon::CouponEngine;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown for the committed cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u64,
    /// Subtotal before the coupon.
    pub subtotal: Money,
    /// Coupon discount, never above the subtotal.
    pub discount: Money,
    /// Subtotal minus discount.
    pub total: Money,
    /// Active coupon code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

impl CartTotals {
    /// Price `cart` with whatever coupon is active.
    pub fn compute(cart: &Cart, coupons: &CouponEngine, currency: Currency) -> Self {
        let subtotal = cart.subtotal();
        let discount = coupons.discount_for(subtotal);
        Self {
            item_count: cart.item_count(),
            subtotal: subtotal.in_currency(currency),
            discount: discount.in_currency(currency),
            total: subtotal.saturating_sub_floor(discount).in_currency(currency),
            coupon_code: coupons.code(),
        }
    }

    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        !self.discount.amount.is_zero()
    }
}
