//! Catalog data source abstraction.

use async_trait::async_trait;

use apm_products::{Category, Product, Supplier};

use crate::error::FetchError;

/// Remote collections the catalog is built from.
///
/// Implementations perform exactly one request per call; there is no retry
/// and no caching at this layer.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError>;

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError>;

    async fn fetch_suppliers(&self) -> Result<Vec<Supplier>, FetchError>;
}
