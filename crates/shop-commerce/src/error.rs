//! Commerce error types.
//!
//! Each component boundary converts its internal failures into one of these
//! typed errors; none of them is fatal and all are recoverable by retrying.

use shop_kv::KvError;
use thiserror::Error;

use crate::ids::ProductId;

/// Errors from cart mutations.
#[derive(Error, Debug)]
pub enum CartError {
    /// The product has no line in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ProductId),

    /// Prices must not be negative.
    #[error("Invalid price for {0}")]
    InvalidPrice(ProductId),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, u32),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in cart total")]
    Overflow,

    /// Reading or writing the persisted cart failed.
    #[error("Cart persistence failed: {0}")]
    Persistence(#[from] KvError),

    /// The cart changed but its coupon could not follow.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Errors from the coupon engine.
#[derive(Error, Debug)]
pub enum CouponError {
    /// Reading or writing the persisted coupon failed.
    #[error("Coupon persistence failed: {0}")]
    Persistence(#[from] KvError),
}

/// Local validation failures, detected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// A required card field was left blank.
    #[error("Missing card field: {0}")]
    MissingField(CardField),

    /// Expiry must be four digits, MMYY, with a month from 01 to 12.
    #[error("Invalid card expiry: {0}")]
    InvalidExpiry(String),
}

/// Card fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    /// Card number.
    Number,
    /// Name printed on the card.
    HolderName,
    /// Expiry date.
    Expiry,
    /// Security code.
    Cvv,
}

impl CardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardField::Number => "number",
            CardField::HolderName => "holderName",
            CardField::Expiry => "expiry",
            CardField::Cvv => "cvv",
        }
    }
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by the remote order API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderApiError {
    /// The server answered with an error status.
    #[error("Order API rejected the request ({status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the structured error body, if any.
        message: Option<String>,
    },

    /// The request did not complete in time.
    #[error("Order API timed out: {0}")]
    Timeout(String),

    /// The server could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body could not be decoded.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The request could not be built or sent.
    #[error("Request error: {0}")]
    Request(String),
}

impl OrderApiError {
    /// Fallback shown when the server gives no usable message.
    pub const GENERIC_MESSAGE: &'static str =
        "We couldn't place your order. Please try again.";

    /// The server's message when available, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            OrderApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => Self::GENERIC_MESSAGE.to_string(),
        }
    }
}

/// Errors from a checkout attempt.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Another attempt is still validating or submitting.
    #[error("A checkout is already in progress")]
    AlreadySubmitting,

    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The order API failed; the cart was left untouched.
    #[error(transparent)]
    Api(#[from] OrderApiError),
}

impl CheckoutError {
    /// Text suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::AlreadySubmitting => "Your order is already being placed.".to_string(),
            CheckoutError::Validation(ValidationError::EmptyCart) => {
                "Your cart is empty.".to_string()
            }
            CheckoutError::Validation(ValidationError::MissingField(field)) => {
                format!("Please fill in the card {}.", field)
            }
            CheckoutError::Validation(ValidationError::InvalidExpiry(_)) => {
                "Card expiry must be in MMYY format.".to_string()
            }
            CheckoutError::Api(err) => err.user_message(),
        }
    }
}

/// Errors restoring or wiring the storefront state.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The currency preference could not be read.
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),
}
