//! reqwest-backed order API client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shop_commerce::checkout::{OrderApi, OrderConfirmation, OrderRequest};
use shop_commerce::{catalog::Product, Currency, OrderApiError};
use tracing::{debug, instrument, warn};

use crate::retry::RetryPolicy;
use crate::timeout::TimeoutConfig;

/// Fetch policy combining timeout and retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Timeout configuration.
    pub timeout: TimeoutConfig,
    /// Retry policy for catalog reads.
    pub catalog_retry: RetryPolicy,
    /// Retry policy for order submissions. None unless overridden.
    pub order_retry: RetryPolicy,
}

impl FetchPolicy {
    /// Default timeouts and no order retries.
    pub fn new(timeout: TimeoutConfig, catalog_retries: u32) -> Self {
        Self {
            timeout,
            catalog_retry: RetryPolicy::new(catalog_retries),
            order_retry: RetryPolicy::none(),
        }
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::new(TimeoutConfig::default(), 2)
    }
}

/// Connection settings for [`HttpOrderClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `"https://api.example.com"`.
    pub base_url: String,
    /// Bearer token from the auth provider.
    pub auth_token: Option<String>,
    pub policy: FetchPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            policy: FetchPolicy::default(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// HTTP client for the storefront order and catalog API.
///
/// - `GET  /products?curr=CODE`
/// - `POST /orders/pix`
/// - `POST /orders/card`
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
    policy: FetchPolicy,
}

impl HttpOrderClient {
    /// Build a client from its configuration.
    pub fn new(config: ClientConfig) -> Result<Self, OrderApiError> {
        let http = Client::builder()
            .connect_timeout(config.policy.timeout.connect)
            .timeout(config.policy.timeout.total)
            .build()
            .map_err(|e| OrderApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.filter(|t| !t.trim().is_empty()),
            policy: config.policy,
        })
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post_order(
        &self,
        path: &str,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        let url = self.url(path);
        let result = self
            .send_with_retry(&self.policy.order_retry, || {
                self.authorized(self.http.post(&url).json(request))
            })
            .await;
        if let Err(e) = &result {
            warn!(url = %url, error = %e, "Order request failed");
        }
        result
    }

    async fn send_with_retry<T, F>(&self, policy: &RetryPolicy, build: F) -> Result<T, OrderApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match execute(build()).await {
                Ok(value) => return Ok(value),
                Err(e) if policy.should_retry(&e, attempt) => {
                    let delay = policy.backoff.delay_for_attempt(attempt);
                    debug!(attempt, ?delay, error = %e, "Retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl OrderApi for HttpOrderClient {
    #[instrument(skip(self, request), fields(items = request.items().len()))]
    async fn create_order_by_pix(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        self.post_order("/orders/pix", request).await
    }

    #[instrument(skip(self, request), fields(items = request.items().len()))]
    async fn create_order_by_card(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        self.post_order("/orders/card", request).await
    }

    #[instrument(skip(self))]
    async fn list_products(&self, currency: Currency) -> Result<Vec<Product>, OrderApiError> {
        let url = self.url("/products");
        let list: ProductList = self
            .send_with_retry(&self.policy.catalog_retry, || {
                self.authorized(self.http.get(&url).query(&[("curr", currency.code())]))
            })
            .await?;
        let products = list.into_products();
        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }
}

/// Send one request and decode a JSON success body.
async fn execute<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, OrderApiError> {
    let response = builder.send().await.map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OrderApiError::Rejected {
            status: status.as_u16(),
            message: parse_error_message(&body),
        });
    }

    let bytes = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| OrderApiError::Decode(e.to_string()))
}

fn map_transport_error(e: reqwest::Error) -> OrderApiError {
    if e.is_timeout() {
        OrderApiError::Timeout(e.to_string())
    } else if e.is_connect() {
        OrderApiError::Connection(e.to_string())
    } else if e.is_decode() || e.is_body() {
        OrderApiError::Decode(e.to_string())
    } else {
        OrderApiError::Request(e.to_string())
    }
}

/// Pull a human-readable message out of a structured error body.
///
/// Accepts `{"message": ..}`, `{"error": ".."}` and `{"error": {"message": ..}}`.
pub fn parse_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            value.get("error").and_then(|e| {
                e.as_str()
                    .or_else(|| e.get("message").and_then(|m| m.as_str()))
            })
        })?
        .trim();

    (!message.is_empty()).then(|| message.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductList {
    Bare(Vec<Product>),
    Wrapped {
        #[serde(alias = "data")]
        products: Vec<Product>,
    },
}

impl ProductList {
    fn into_products(self) -> Vec<Product> {
        match self {
            ProductList::Bare(products) | ProductList::Wrapped { products } => products,
        }
    }
}
