//! Coupon codes and the active-coupon engine.

mod engine;
mod rules;

pub use engine::{AppliedCoupon, CouponEngine, CouponOutcome};
pub use rules::{find_rule, normalize_code, CouponRule, DiscountValue, COUPON_RULES};
