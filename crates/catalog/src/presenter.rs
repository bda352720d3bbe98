//! Product list presenter: category filtering on top of the catalog streams.

use std::sync::Arc;

use tracing::{debug, warn};

use apm_core::DomainResult;
use apm_events::{BehaviorSubject, Observable, StreamError, combine_latest};
use apm_products::{Category, CategoryFilter, Product, filter_by_category};

use crate::service::CatalogService;
use crate::view::ProductListView;

pub const PAGE_TITLE: &str = "Product List";

/// Presents the catalog as a filterable product list.
///
/// Stream failures are captured into [`ProductListPresenter::error_message`]
/// and replaced by a single empty list; they never reach the subscriber.
/// A captured message stays until [`ProductListPresenter::clear_error`].
#[derive(Debug)]
pub struct ProductListPresenter {
    catalog: Arc<CatalogService>,
    category_selected: BehaviorSubject<CategoryFilter>,
    error_message: Arc<BehaviorSubject<Option<String>>>,
}

impl ProductListPresenter {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            catalog,
            category_selected: BehaviorSubject::new(CategoryFilter::All),
            error_message: Arc::new(BehaviorSubject::new(None)),
        }
    }

    pub fn page_title(&self) -> &'static str {
        PAGE_TITLE
    }

    /// Select a category from raw input (e.g. a `<select>` value).
    ///
    /// `"0"` and blank input show all products. Non-numeric input is rejected
    /// and the current selection is kept.
    ///
    /// Only plain non-negative integers are accepted. Unlike loose numeric
    /// coercion, `"abc"` does not fall back to showing all products, and
    /// `"3.0"` or `"-1"` are errors rather than category 3 or an empty list.
    pub fn select_category(&self, raw: &str) -> DomainResult<()> {
        let filter = raw.parse::<CategoryFilter>()?;
        self.select_category_filter(filter);
        Ok(())
    }

    pub fn select_category_filter(&self, filter: CategoryFilter) {
        debug!(category_id = filter.as_id(), "category selected");
        self.category_selected.next(filter);
    }

    pub fn selected_category(&self) -> CategoryFilter {
        self.category_selected.value()
    }

    pub fn category_selection(&self) -> Observable<CategoryFilter> {
        self.category_selected.as_observable()
    }

    /// Products (with additions) narrowed to the selected category.
    pub fn filtered_products(&self) -> Observable<Vec<Product>> {
        let errors = Arc::clone(&self.error_message);

        combine_latest(
            &self.catalog.products_with_additions(),
            &self.category_selected.as_observable(),
        )
        .map(|(products, filter)| filter_by_category(&products, filter))
        .catch_error(move |error| capture_error(&errors, "products", error))
    }

    pub fn categories(&self) -> Observable<Vec<Category>> {
        let errors = Arc::clone(&self.error_message);

        self.catalog
            .product_categories()
            .catch_error(move |error| capture_error(&errors, "categories", error))
    }

    /// Add the fallback product to the catalog (in-memory only).
    pub fn add_product(&self) {
        self.catalog.add_product(None);
    }

    /// Last captured stream error, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error_message.value()
    }

    pub fn error_messages(&self) -> Observable<Option<String>> {
        self.error_message.as_observable()
    }

    pub fn clear_error(&self) {
        self.error_message.next(None);
    }

    /// Subscribe a headless view to this presenter's streams.
    pub fn attach(&self) -> ProductListView {
        ProductListView::attach(self)
    }

    /// Complete the presenter's own subjects.
    pub fn dispose(&self) {
        self.category_selected.complete();
        self.error_message.complete();
    }
}

fn capture_error<T>(
    slot: &BehaviorSubject<Option<String>>,
    source: &'static str,
    error: StreamError,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    warn!(source, error = %error, "stream failed; showing empty list");
    slot.next(Some(error.message().to_string()));
    Observable::of(Vec::new())
}
