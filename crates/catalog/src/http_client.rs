//! HTTP catalog client (reqwest).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use apm_products::{Category, Product, Supplier};

use crate::client::CatalogClient;
use crate::config::CatalogConfig;
use crate::error::FetchError;

/// Fetches the catalog collections with plain `GET` requests.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    products_url: String,
    categories_url: String,
    suppliers_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: reqwest::Client, config: &CatalogConfig) -> Self {
        Self {
            client,
            products_url: config.products_url(),
            categories_url: config.categories_url(),
            suppliers_url: config.suppliers_url(),
            token: config.auth_token.clone(),
            timeout: config.timeout,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut req = self.client.get(url).timeout(self.timeout);

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::backend(
                status.as_u16(),
                &body,
                status.canonical_reason().unwrap_or("unknown status"),
            ));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, FetchError> {
        self.get_json(&self.products_url).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError> {
        self.get_json(&self.categories_url).await
    }

    async fn fetch_suppliers(&self) -> Result<Vec<Supplier>, FetchError> {
        self.get_json(&self.suppliers_url).await
    }
}
