//! Catalog data service: owns the canonical catalog streams.
//!
//! ## Data flow
//!
//! ```text
//! load() ──► products ──┐
//!                       ├─ combine_latest ─► products_with_categories ─┬─► selected_product
//! load() ──► categories ┘                                              │        ▲
//!                                                                      │   select_product()
//!                                                                      └─► products_with_additions
//!                                                                                 ▲
//!                                                                            add_product()
//! ```
//!
//! Snapshots are held in replaying subjects, so any number of derived streams
//! share one fetch per `load()`. Additions are in-memory only: nothing is
//! written back to the backend and they are gone after a restart.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, trace};

use apm_core::ProductId;
use apm_events::{BehaviorSubject, Observable, ReplaySubject, StreamError, combine_latest};
use apm_products::{
    Category, Product, Supplier, enrich_products, fallback_product, find_selected, suppliers_for,
};

use crate::client::CatalogClient;
use crate::error::FetchError;

/// Owner of the catalog's subjects and the streams derived from them.
pub struct CatalogService {
    client: Arc<dyn CatalogClient>,
    products: ReplaySubject<Vec<Product>>,
    categories: ReplaySubject<Vec<Category>>,
    suppliers: ReplaySubject<Vec<Supplier>>,
    product_selected: BehaviorSubject<Option<ProductId>>,
    product_additions: BehaviorSubject<Vec<Product>>,
}

impl CatalogService {
    /// Nothing is fetched until [`CatalogService::load`] is called.
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self {
            client,
            products: ReplaySubject::new(),
            categories: ReplaySubject::new(),
            suppliers: ReplaySubject::new(),
            product_selected: BehaviorSubject::new(None),
            product_additions: BehaviorSubject::new(Vec::new()),
        }
    }

    /// Fetch every collection (concurrently) and publish the results.
    ///
    /// Each collection succeeds or fails on its own. A failure terminates that
    /// collection's stream with the user-facing message; later loads leave a
    /// terminated stream untouched.
    pub async fn load(&self) {
        let (products, categories, suppliers) = tokio::join!(
            self.client.fetch_products(),
            self.client.fetch_categories(),
            self.client.fetch_suppliers(),
        );

        publish("products", &self.products, products);
        publish("categories", &self.categories, categories);
        publish("suppliers", &self.suppliers, suppliers);
    }

    /// Raw product snapshots as fetched.
    pub fn fetch_products(&self) -> Observable<Vec<Product>> {
        self.products.as_observable()
    }

    pub fn product_categories(&self) -> Observable<Vec<Category>> {
        self.categories.as_observable()
    }

    pub fn suppliers(&self) -> Observable<Vec<Supplier>> {
        self.suppliers.as_observable()
    }

    /// Products enriched with category names and marked-up prices.
    ///
    /// Emits once both a product and a category snapshot exist, then again
    /// whenever either changes.
    pub fn products_with_categories(&self) -> Observable<Vec<Product>> {
        combine_latest(&self.fetch_products(), &self.product_categories())
            .map(|(products, categories)| enrich_products(&products, &categories))
    }

    pub fn select_product(&self, product_id: ProductId) {
        info!(%product_id, "product selected");
        if !self.product_selected.next(Some(product_id)) {
            debug!(%product_id, "selection ignored: catalog disposed");
        }
    }

    /// The enriched product matching the current selection, `None` if nothing matches.
    pub fn selected_product(&self) -> Observable<Option<Product>> {
        combine_latest(
            &self.products_with_categories(),
            &self.product_selected.as_observable(),
        )
        .map(|(products, selected)| find_selected(&products, selected))
    }

    /// Suppliers of the currently selected product (empty when nothing is selected).
    pub fn selected_product_suppliers(&self) -> Observable<Vec<Supplier>> {
        combine_latest(&self.selected_product(), &self.suppliers())
            .map(|(product, suppliers)| suppliers_for(product.as_ref(), &suppliers))
    }

    /// Append `product` (or the fallback product) to the in-memory additions.
    ///
    /// No validation and no de-duplication.
    pub fn add_product(&self, product: Option<Product>) {
        let product = product.unwrap_or_else(fallback_product);
        info!(product_id = %product.id, name = %product.product_name, "product added (in-memory only)");

        let accepted = self.product_additions.update(move |added| {
            let mut next = added.clone();
            next.push(product);
            next
        });
        if !accepted {
            debug!("addition ignored: catalog disposed");
        }
    }

    /// Enriched products followed by every added product, in arrival order.
    ///
    /// Added products are never re-enriched and never dropped when a fresh
    /// snapshot arrives.
    pub fn products_with_additions(&self) -> Observable<Vec<Product>> {
        combine_latest(
            &self.products_with_categories(),
            &self.product_additions.as_observable(),
        )
        .map(|(mut products, added)| {
            products.extend(added);
            products
        })
    }

    /// Products added so far (not persisted anywhere).
    pub fn added_products(&self) -> Vec<Product> {
        self.product_additions.value()
    }

    /// Complete every stream. Later loads, selections and additions are no-ops.
    pub fn dispose(&self) {
        self.products.complete();
        self.categories.complete();
        self.suppliers.complete();
        self.product_selected.complete();
        self.product_additions.complete();
    }
}

impl Drop for CatalogService {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl core::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CatalogService")
            .field("added_products", &self.product_additions.value().len())
            .field("products_closed", &self.products.is_closed())
            .finish_non_exhaustive()
    }
}

fn publish<T>(
    resource: &'static str,
    subject: &ReplaySubject<Vec<T>>,
    result: Result<Vec<T>, FetchError>,
) where
    T: Clone + Send + Sync + Serialize + 'static,
{
    match result {
        Ok(items) => {
            debug!(resource, count = items.len(), "catalog snapshot fetched");
            if tracing::enabled!(tracing::Level::TRACE) {
                let payload = serde_json::to_string(&items).unwrap_or_default();
                trace!(resource, %payload, "catalog snapshot payload");
            }
            if !subject.next(items) {
                debug!(resource, "snapshot dropped: stream already terminated");
            }
        }
        Err(err) => {
            error!(resource, error = %err, "catalog fetch failed");
            subject.error(StreamError::new(err.user_message()));
        }
    }
}
