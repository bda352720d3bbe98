//! `apm-catalog`
//!
//! **Responsibility:** reactive product catalog for the product list screen.
//!
//! This crate provides:
//! - [`CatalogClient`] with an HTTP ([`HttpCatalogClient`]) and an in-memory
//!   ([`InMemoryCatalogClient`]) implementation
//! - [`CatalogService`]: fetched snapshots, enrichment, selection and
//!   in-memory additions as observable streams
//! - [`ProductListPresenter`]: category filtering and error capture
//! - [`ProductListView`]: a headless subscriber holding the latest view state
//!
//! The backend remains the authority; additions are never written back.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod in_memory;
pub mod presenter;
pub mod service;
pub mod view;

pub use client::CatalogClient;
pub use config::CatalogConfig;
pub use error::{ConfigError, FetchError};
pub use http_client::HttpCatalogClient;
pub use in_memory::InMemoryCatalogClient;
pub use presenter::{PAGE_TITLE, ProductListPresenter};
pub use service::CatalogService;
pub use view::{ProductListSnapshot, ProductListView};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
