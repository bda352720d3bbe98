//! `apm-core`: catalog foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no streams).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, SupplierId};
