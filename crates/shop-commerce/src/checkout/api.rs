//! The remote order service seam.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::catalog::Product;
use crate::checkout::order::{OrderConfirmation, OrderRequest};
use crate::error::OrderApiError;
use crate::money::Currency;

/// Remote order and catalog API.
///
/// Implementations own their timeouts and retry policy; callers make
/// exactly one call per order submission.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Place an order paid by Pix.
    async fn create_order_by_pix(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError>;

    /// Place an order paid by card.
    async fn create_order_by_card(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError>;

    /// Fetch the catalog priced in `currency`.
    async fn list_products(&self, currency: Currency) -> Result<Vec<Product>, OrderApiError>;
}

#[async_trait]
impl<T: OrderApi + ?Sized> OrderApi for Arc<T> {
    async fn create_order_by_pix(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        (**self).create_order_by_pix(request).await
    }

    async fn create_order_by_card(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        (**self).create_order_by_card(request).await
    }

    async fn list_products(&self, currency: Currency) -> Result<Vec<Product>, OrderApiError> {
        (**self).list_products(currency).await
    }
}
