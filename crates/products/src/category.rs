//! Product categories (read-only reference data).

use apm_core::{CategoryId, Entity, find_by_id};
use serde::{Deserialize, Serialize};

/// Name given to a product whose category id matches no known category.
pub const MISSING_CATEGORY_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Resolve a category id to its name, falling back to [`MISSING_CATEGORY_NAME`].
pub fn category_name(categories: &[Category], id: CategoryId) -> &str {
    find_by_id(categories, id)
        .map(|category| category.name.as_str())
        .unwrap_or(MISSING_CATEGORY_NAME)
}
