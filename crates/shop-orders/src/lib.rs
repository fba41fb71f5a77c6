//! HTTP client for the storefront order and catalog API.
//!
//! [`HttpOrderClient`] implements [`shop_commerce::checkout::OrderApi`] over
//! reqwest. Each call gets the configured timeouts; catalog reads retry
//! transient failures with exponential backoff, order submissions are sent
//! exactly once.

mod client;
mod retry;
mod timeout;

pub use client::{parse_error_message, ClientConfig, FetchPolicy, HttpOrderClient};
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};
pub use timeout::TimeoutConfig;
