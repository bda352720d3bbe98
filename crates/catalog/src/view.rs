//! Headless product list view (latest values of the presenter streams).

use std::sync::{Arc, Mutex};

use serde::Serialize;

use apm_events::{Notification, Subscription};
use apm_products::{Category, CategoryFilter, Product};

use crate::lock;
use crate::presenter::ProductListPresenter;

/// Everything a renderer needs to draw the product list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListSnapshot {
    pub page_title: String,
    pub selected_category: CategoryFilter,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub error_message: Option<String>,
}

#[derive(Debug, Default)]
struct ViewState {
    selected_category: CategoryFilter,
    products: Vec<Product>,
    categories: Vec<Category>,
    error_message: Option<String>,
}

/// Keeps the presenter's streams subscribed for as long as it lives.
///
/// Dropping the view (or calling [`ProductListView::detach`]) disposes every
/// subscription it holds.
#[derive(Debug)]
pub struct ProductListView {
    page_title: &'static str,
    state: Arc<Mutex<ViewState>>,
    subscription: Subscription,
}

impl ProductListView {
    pub(crate) fn attach(presenter: &ProductListPresenter) -> Self {
        let state = Arc::new(Mutex::new(ViewState::default()));
        let mut subscription = Subscription::empty();

        subscription.add(presenter.filtered_products().subscribe(keep_latest(
            &state,
            |view, products| view.products = products,
        )));
        subscription.add(presenter.categories().subscribe(keep_latest(
            &state,
            |view, categories| view.categories = categories,
        )));
        subscription.add(presenter.category_selection().subscribe(keep_latest(
            &state,
            |view, filter| view.selected_category = filter,
        )));
        subscription.add(presenter.error_messages().subscribe(keep_latest(
            &state,
            |view, message| view.error_message = message,
        )));

        Self {
            page_title: presenter.page_title(),
            state,
            subscription,
        }
    }

    pub fn products(&self) -> Vec<Product> {
        lock(&self.state).products.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        lock(&self.state).categories.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        lock(&self.state).error_message.clone()
    }

    pub fn snapshot(&self) -> ProductListSnapshot {
        let state = lock(&self.state);
        ProductListSnapshot {
            page_title: self.page_title.to_string(),
            selected_category: state.selected_category,
            products: state.products.clone(),
            categories: state.categories.clone(),
            error_message: state.error_message.clone(),
        }
    }

    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}

fn keep_latest<T, F>(
    state: &Arc<Mutex<ViewState>>,
    apply: F,
) -> impl Fn(Notification<T>) + Send + Sync + 'static
where
    T: Send + 'static,
    F: Fn(&mut ViewState, T) + Send + Sync + 'static,
{
    let state = Arc::clone(state);
    move |notification| {
        if let Notification::Next(value) = notification {
            apply(&mut lock(&state), value);
        }
    }
}
