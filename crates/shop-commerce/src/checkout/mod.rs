//! Checkout: payment validation, order submission, the state machine.

mod api;
mod flow;
mod order;
mod payment;

#[cfg(test)]
pub use api::MockOrderApi;
pub use api::OrderApi;
pub use flow::{CheckoutOrchestrator, CheckoutState};
pub use order::{CardFields, OrderConfirmation, OrderItem, OrderRequest};
pub use payment::{parse_expiry, CardDetails, CardInput, PaymentInput, PaymentMethod};
