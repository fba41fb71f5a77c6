//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shop_commerce::checkout::{OrderApi, OrderConfirmation, OrderRequest};
use shop_commerce::prelude::*;
use shop_kv::{KeyValueStore, KvError, KvResult, MemoryStore};
use tokio::sync::Notify;

/// A memory store whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    failing_key: Mutex<Option<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fail writes and removes for one key only.
    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.failing_key.lock().unwrap() = key.map(str::to_string);
    }

    fn write_fails(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
            || self.failing_key.lock().unwrap().as_deref() == Some(key)
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::StoreError("read failed".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> KvResult<()> {
        if self.write_fails(key) {
            return Err(KvError::StoreError("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        if self.write_fails(key) {
            return Err(KvError::StoreError("disk full".to_string()));
        }
        self.inner.remove(key).await
    }
}

/// An order API that records requests and answers with a fixed result.
///
/// When gated, every order call waits for [`StubApi::release`].
pub struct StubApi {
    response: Mutex<Result<OrderConfirmation, OrderApiError>>,
    requests: Mutex<Vec<OrderRequest>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
    entered: Notify,
}

impl StubApi {
    pub fn succeeding(order_number: &str) -> Self {
        Self::with_response(Ok(OrderConfirmation {
            order_number: OrderId::new(order_number),
            total: Amount::ZERO,
            discount: None,
            currency: None,
            status: Some("pending".to_string()),
            created_at: None,
        }))
    }

    pub fn failing(error: OrderApiError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<OrderConfirmation, OrderApiError>) -> Self {
        Self {
            response: Mutex::new(response),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
            entered: Notify::new(),
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    /// Wait until an order call is blocked on the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn place(&self, request: &OrderRequest) -> Result<OrderConfirmation, OrderApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        self.response.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderApi for StubApi {
    async fn create_order_by_pix(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        self.place(request).await
    }

    async fn create_order_by_card(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, OrderApiError> {
        self.place(request).await
    }

    async fn list_products(&self, _currency: Currency) -> Result<Vec<Product>, OrderApiError> {
        Ok(catalog())
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product::new("tee", "Camiseta", Amount::from_cents(4990)).with_image("tee.png"),
        Product::new("mug", "Caneca", Amount::from_cents(2500)),
        Product::new("cap", "Boné", Amount::from_cents(3333)),
    ]
}

pub fn product(id: &str) -> Product {
    catalog()
        .into_iter()
        .find(|p| p.id.as_str() == id)
        .unwrap()
}

pub fn storefront(backend: Arc<FlakyStore>) -> Storefront {
    Storefront::new(backend, StorageKeys::default(), Currency::BRL)
}
