//! The closed table of coupon rules.

use crate::money::Amount;

/// Value of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountValue {
    /// Whole-number percentage of the subtotal.
    Percentage(u32),
    /// Fixed amount off.
    Fixed(Amount),
}

impl DiscountValue {
    /// Calculate the discount for a given subtotal.
    ///
    /// The result is never negative and never exceeds the subtotal.
    pub fn calculate(&self, subtotal: Amount) -> Amount {
        let subtotal = subtotal.max(Amount::ZERO);
        let raw = match self {
            DiscountValue::Percentage(percent) => subtotal.percentage(*percent),
            DiscountValue::Fixed(amount) => *amount,
        };
        raw.max(Amount::ZERO).min(subtotal)
    }
}

/// A known coupon code and what it is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponRule {
    /// Normalized (uppercase) code.
    pub code: &'static str,
    /// Short human description.
    pub description: &'static str,
    /// Discount value.
    pub value: DiscountValue,
}

/// Every coupon the storefront accepts.
pub const COUPON_RULES: &[CouponRule] = &[
    CouponRule {
        code: "PROMO10",
        description: "10% off the cart",
        value: DiscountValue::Percentage(10),
    },
    CouponRule {
        code: "FRETEGRATIS",
        description: "20.00 off (free shipping)",
        value: DiscountValue::Fixed(Amount::from_cents(2000)),
    },
];

/// Trim and uppercase a code before comparison.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Look up a code, normalizing it first.
pub fn find_rule(code: &str) -> Option<&'static CouponRule> {
    let code = normalize_code(code);
    COUPON_RULES.iter().find(|rule| rule.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_rule_normalizes() {
        assert_eq!(find_rule("  promo10 ").map(|r| r.code), Some("PROMO10"));
        assert_eq!(find_rule("FreteGratis").map(|r| r.code), Some("FRETEGRATIS"));
        assert!(find_rule("PROMO20").is_none());
        assert!(find_rule("").is_none());
    }

    #[test]
    fn test_percentage_discount() {
        let value = DiscountValue::Percentage(10);
        assert_eq!(value.calculate(Amount::from_cents(10000)).cents(), 1000);
        assert_eq!(value.calculate(Amount::ZERO), Amount::ZERO);
    }

    #[test]
    fn test_fixed_discount_is_clamped() {
        let value = DiscountValue::Fixed(Amount::from_cents(2000));
        assert_eq!(value.calculate(Amount::from_cents(10000)).cents(), 2000);
        assert_eq!(value.calculate(Amount::from_cents(1500)).cents(), 1500);
        assert_eq!(value.calculate(Amount::from_cents(-100)), Amount::ZERO);
    }
}
