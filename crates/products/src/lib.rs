//! Products domain module.
//!
//! This crate contains the catalog records and the pure transformations the
//! catalog streams are built from (no IO, no HTTP, no streams).

pub mod category;
pub mod filter;
pub mod product;
pub mod supplier;

pub use category::{Category, MISSING_CATEGORY_NAME, category_name};
pub use filter::{CategoryFilter, filter_by_category};
pub use product::{PRICE_MARKUP, Product, enrich_products, fallback_product, find_selected};
pub use supplier::{Supplier, suppliers_for};
