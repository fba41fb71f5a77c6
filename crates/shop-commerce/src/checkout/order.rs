//! Outbound order request and the server's confirmation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::checkout::payment::PaymentMethod;
use crate::ids::{OrderId, ProductId};
use crate::money::{Amount, Currency};

/// One ordered product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Card fields as sent to the card endpoint.
#[derive(Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub cvv: String,
}

impl fmt::Debug for CardFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardFields")
            .field("holder_name", &self.holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

/// An order ready to submit.
///
/// Built once from a cart snapshot at submission time and never changed
/// afterwards. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    items: Vec<OrderItem>,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    coupon_code: Option<String>,
    #[serde(flatten)]
    card: Option<CardFields>,
}

impl OrderRequest {
    /// Snapshot `cart` into a request.
    pub fn from_cart(
        cart: &Cart,
        currency: Currency,
        coupon_code: Option<String>,
        payment: &PaymentMethod,
    ) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            })
            .collect();

        let card = match payment {
            PaymentMethod::Pix => None,
            PaymentMethod::Card(details) => Some(CardFields {
                number: details.number.clone(),
                holder_name: details.holder_name.clone(),
                expiry_month: details.expiry_month,
                expiry_year: details.expiry_year,
                cvv: details.cvv.clone(),
            }),
        };

        Self {
            items,
            currency,
            coupon_code,
            card,
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn card(&self) -> Option<&CardFields> {
        self.card.as_ref()
    }

    /// `"pix"` or `"card"`.
    pub fn kind(&self) -> &'static str {
        if self.card.is_some() {
            "card"
        } else {
            "pix"
        }
    }
}

/// What the order API returns on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Server-assigned order number.
    #[serde(alias = "id", alias = "orderId")]
    pub order_number: OrderId,
    /// Total charged.
    pub total: Amount,
    /// Discount the server applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
