//! In-memory catalog client for tests/dev.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use apm_products::{Category, Product, Supplier};

use crate::client::CatalogClient;
use crate::error::FetchError;
use crate::lock;

/// Canned responses, settable between loads.
///
/// - No IO / no latency
/// - Each collection can be switched to a failure independently
/// - Counts requests so callers can check when fetching happened
#[derive(Debug)]
pub struct InMemoryCatalogClient {
    products: Mutex<Result<Vec<Product>, FetchError>>,
    categories: Mutex<Result<Vec<Category>, FetchError>>,
    suppliers: Mutex<Result<Vec<Supplier>, FetchError>>,
    requests: AtomicUsize,
}

impl InMemoryCatalogClient {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products: Mutex::new(Ok(products)),
            categories: Mutex::new(Ok(categories)),
            suppliers: Mutex::new(Ok(Vec::new())),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn with_suppliers(self, suppliers: Vec<Supplier>) -> Self {
        *lock(&self.suppliers) = Ok(suppliers);
        self
    }

    pub fn set_products(&self, products: Result<Vec<Product>, FetchError>) {
        *lock(&self.products) = products;
    }

    pub fn set_categories(&self, categories: Result<Vec<Category>, FetchError>) {
        *lock(&self.categories) = categories;
    }

    pub fn set_suppliers(&self, suppliers: Result<Vec<Supplier>, FetchError>) {
        *lock(&self.suppliers) = suppliers;
    }

    /// Total number of fetch calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn serve<T: Clone>(&self, slot: &Mutex<Result<Vec<T>, FetchError>>) -> Result<Vec<T>, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        lock(slot).clone()
    }
}

impl Default for InMemoryCatalogClient {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        self.serve(&self.products)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError> {
        self.serve(&self.categories)
    }

    async fn fetch_suppliers(&self) -> Result<Vec<Supplier>, FetchError> {
        self.serve(&self.suppliers)
    }
}
