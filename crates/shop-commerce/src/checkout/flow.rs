//! Checkout state machine.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::cart::CartStore;
use crate::checkout::api::OrderApi;
use crate::checkout::order::{OrderConfirmation, OrderRequest};
use crate::checkout::payment::{PaymentInput, PaymentMethod};
use crate::coupon::CouponEngine;
use crate::currency::CurrencyPreference;
use crate::error::{CheckoutError, ValidationError};

/// Where a checkout attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// No attempt yet.
    #[default]
    Idle,
    /// Checking the cart and payment details locally.
    Validating,
    /// Waiting on the order API.
    Submitting,
    /// The last attempt placed an order.
    Succeeded,
    /// The last attempt failed; the cart is untouched.
    Failed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Succeeded => "succeeded",
            CheckoutState::Failed => "failed",
        }
    }

    /// Check if an attempt is underway.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, CheckoutState::Validating | CheckoutState::Submitting)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns the cart into a remote order.
///
/// Reads the cart, coupon and currency but owns none of them. Only one
/// attempt runs at a time per state cell; a second `submit` while one is in
/// flight is rejected without touching the network. Orchestrators built with
/// [`CheckoutOrchestrator::with_state`] over the same cell exclude each other.
pub struct CheckoutOrchestrator {
    cart: Arc<CartStore>,
    coupons: Arc<CouponEngine>,
    currency: Arc<CurrencyPreference>,
    api: Arc<dyn OrderApi>,
    state: Arc<Mutex<CheckoutState>>,
}

impl CheckoutOrchestrator {
    pub fn new(
        cart: Arc<CartStore>,
        coupons: Arc<CouponEngine>,
        currency: Arc<CurrencyPreference>,
        api: Arc<dyn OrderApi>,
    ) -> Self {
        Self::with_state(cart, coupons, currency, api, Arc::default())
    }

    /// Build over a state cell shared with other orchestrators.
    pub fn with_state(
        cart: Arc<CartStore>,
        coupons: Arc<CouponEngine>,
        currency: Arc<CurrencyPreference>,
        api: Arc<dyn OrderApi>,
        state: Arc<Mutex<CheckoutState>>,
    ) -> Self {
        Self {
            cart,
            coupons,
            currency,
            api,
            state,
        }
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate, submit and, on confirmation, clear the cart and coupon.
    ///
    /// On any failure the cart and coupon are left exactly as they were.
    #[instrument(skip(self, payment), fields(method = payment.kind()))]
    pub async fn submit(&self, payment: &PaymentInput) -> Result<OrderConfirmation, CheckoutError> {
        let attempt = self.begin()?;

        let cart = self.cart.snapshot();
        if cart.is_empty() {
            info!("Checkout rejected: cart is empty");
            return Err(attempt.fail(ValidationError::EmptyCart.into()));
        }
        let method = match payment.validate() {
            Ok(method) => method,
            Err(e) => {
                info!(error = %e, "Checkout rejected by validation");
                return Err(attempt.fail(e.into()));
            }
        };

        let request = OrderRequest::from_cart(
            &cart,
            self.currency.get(),
            self.coupons.code(),
            &method,
        );
        attempt.advance(CheckoutState::Submitting);
        info!(
            items = request.items().len(),
            currency = %request.currency(),
            coupon = request.coupon_code().unwrap_or(""),
            "Submitting order"
        );

        let result = match method {
            PaymentMethod::Pix => self.api.create_order_by_pix(&request).await,
            PaymentMethod::Card(_) => self.api.create_order_by_card(&request).await,
        };

        match result {
            Ok(confirmation) => {
                if let Err(e) = self.cart.clear().await {
                    warn!(error = %e, "Order placed but cart could not be cleared");
                }
                if let Err(e) = self.coupons.remove().await {
                    warn!(error = %e, "Order placed but coupon could not be removed");
                }
                attempt.finish(CheckoutState::Succeeded);
                info!(order_number = %confirmation.order_number, total = %confirmation.total, "Order placed");
                Ok(confirmation)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed");
                Err(attempt.fail(e.into()))
            }
        }
    }

    fn begin(&self) -> Result<Attempt<'_>, CheckoutError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_in_flight() {
            return Err(CheckoutError::AlreadySubmitting);
        }
        *state = CheckoutState::Validating;
        Ok(Attempt {
            state: self.state.as_ref(),
            done: false,
        })
    }
}

impl fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// An in-flight attempt. Dropping it unfinished (the submit future was
/// cancelled) marks the checkout as failed so a new one can start.
struct Attempt<'a> {
    state: &'a Mutex<CheckoutState>,
    done: bool,
}

impl Attempt<'_> {
    fn advance(&self, next: CheckoutState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn finish(mut self, last: CheckoutState) {
        self.advance(last);
        self.done = true;
    }

    fn fail(self, error: CheckoutError) -> CheckoutError {
        self.finish(CheckoutState::Failed);
        error
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.advance(CheckoutState::Failed);
        }
    }
}
