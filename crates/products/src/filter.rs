//! Category filter selection.

use core::str::FromStr;

use apm_core::{CategoryId, DomainError};
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Which products a list shows.
///
/// On the wire (and in user input) the filter is a bare category id where the
/// reserved id [`CategoryFilter::SHOW_ALL_ID`] means "no filter".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    /// Sentinel id meaning "show all".
    pub const SHOW_ALL_ID: u32 = 0;

    pub fn from_id(id: u32) -> Self {
        if id == Self::SHOW_ALL_ID {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(CategoryId::new(id))
        }
    }

    pub fn as_id(self) -> u32 {
        match self {
            CategoryFilter::All => Self::SHOW_ALL_ID,
            CategoryFilter::Only(id) => id.get(),
        }
    }

    pub fn matches(self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => product.in_category(id),
        }
    }
}

impl From<u32> for CategoryFilter {
    fn from(id: u32) -> Self {
        Self::from_id(id)
    }
}

impl From<CategoryFilter> for u32 {
    fn from(filter: CategoryFilter) -> Self {
        filter.as_id()
    }
}

/// Parse a raw selection (e.g. a `<select>` value).
///
/// Blank input selects the sentinel, like an unset selection.
impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(CategoryFilter::All);
        }
        let id = trimmed
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_id(format!("category {s:?}: {e}")))?;
        Ok(Self::from_id(id))
    }
}

/// Products matching `filter`, in their original order.
pub fn filter_by_category(products: &[Product], filter: CategoryFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|product| filter.matches(product))
        .cloned()
        .collect()
}
