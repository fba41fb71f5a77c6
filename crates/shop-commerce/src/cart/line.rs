//! Cart and cart line types.

use crate::catalog::Product;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::money::Amount;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line.
pub const MAX_QUANTITY_PER_ITEM: u32 = 9999;

/// One product in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line is for.
    pub product_id: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Product image reference.
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Unit price snapshotted when the product was first added.
    pub unit_price: Amount,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Create a line with quantity 1 from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            image_ref: product.image_ref.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    /// `unit_price × quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Amount> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// An ordered list of cart lines, at most one per product.
///
/// Persisted as a bare JSON array of lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines, merging duplicate products and dropping
    /// zero-quantity or negatively priced lines.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity == 0 || line.unit_price.is_negative() {
                continue;
            }
            match cart.line_mut(&line.product_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_QUANTITY_PER_ITEM);
                }
                None => {
                    let mut line = line;
                    line.quantity = line.quantity.min(MAX_QUANTITY_PER_ITEM);
                    cart.lines.push(line);
                }
            }
        }
        cart
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line, or appends a new one at quantity 1.
    /// Returns the line's new quantity.
    pub fn add(&mut self, product: &Product) -> Result<u32, CartError> {
        if product.price.is_negative() {
            return Err(CartError::InvalidPrice(product.id.clone()));
        }

        if let Some(existing) = self.line_mut(&product.id) {
            let new_quantity = existing
                .quantity
                .checked_add(1)
                .ok_or(CartError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CartError::QuantityExceedsLimit(
                    i64::from(new_quantity),
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            existing.quantity = new_quantity;
            return Ok(new_quantity);
        }

        self.lines.push(CartLine::from_product(product));
        Ok(1)
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() < len_before
    }

    /// Set a line's quantity.
    ///
    /// A quantity below 1 removes the line (absent is fine). Otherwise the
    /// line must exist. Returns the resulting quantity, 0 when removed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<u32, CartError> {
        if quantity < 1 {
            self.remove(product_id);
            return Ok(0);
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY_PER_ITEM)
            .ok_or(CartError::QuantityExceedsLimit(quantity, MAX_QUANTITY_PER_ITEM))?;

        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CartError::ItemNotInCart(product_id.clone()))?;
        line.quantity = quantity;
        Ok(quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get a product's line.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == product_id)
    }

    /// Check if a product has a line.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Quantity of a product, 0 if absent.
    pub fn quantity(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `Σ unit_price × quantity`, failing on overflow.
    pub fn try_subtotal(&self) -> Result<Amount, CartError> {
        self.lines.iter().try_fold(Amount::ZERO, |acc, line| {
            line.line_total()
                .and_then(|t| acc.checked_add(t))
                .ok_or(CartError::Overflow)
        })
    }

    /// `Σ unit_price × quantity`.
    ///
    /// Carts built through the mutating methods never overflow; a record
    /// restored from elsewhere saturates instead.
    pub fn subtotal(&self) -> Amount {
        self.lines.iter().fold(Amount::ZERO, |acc, line| {
            let total = line
                .line_total()
                .unwrap_or(Amount::from_cents(i64::MAX));
            acc.saturating_add(total)
        })
    }
}
