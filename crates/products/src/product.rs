use apm_core::{CategoryId, Entity, ProductId, SupplierId, find_by_id};
use serde::{Deserialize, Serialize};

use crate::category::{Category, category_name};

/// Multiplier applied to the canonical price when a product is enriched.
pub const PRICE_MARKUP: f64 = 1.5;

/// Catalog product record.
///
/// Fetched records carry the canonical price and no category name; enriched
/// copies (see [`enrich_products`]) carry the marked-up price, the resolved
/// category name and the search key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity_in_stock: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplier_ids: Vec<SupplierId>,
}

impl Product {
    /// Copy of this product with category name, price markup and search key applied.
    ///
    /// Callers must pass the fetched record, never an already enriched one.
    pub fn enriched(&self, categories: &[Category]) -> Product {
        Product {
            price: self.price * PRICE_MARKUP,
            category: Some(category_name(categories, self.category_id).to_string()),
            search_key: vec![self.product_name.clone()],
            ..self.clone()
        }
    }

    pub fn in_category(&self, category_id: CategoryId) -> bool {
        self.category_id == category_id
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Enrich a fetched product snapshot against a category snapshot.
///
/// Pure: `products` is left untouched and a fresh list is returned, so
/// re-running this on every emission never compounds the markup.
pub fn enrich_products(products: &[Product], categories: &[Category]) -> Vec<Product> {
    products
        .iter()
        .map(|product| product.enriched(categories))
        .collect()
}

/// The product whose id equals `selected`, if any.
pub fn find_selected(products: &[Product], selected: Option<ProductId>) -> Option<Product> {
    selected.and_then(|id| find_by_id(products, id).cloned())
}

/// Product appended when "add" is triggered without an explicit product.
pub fn fallback_product() -> Product {
    Product {
        id: ProductId::new(42),
        product_name: "Another One".to_string(),
        product_code: "TBX-0042".to_string(),
        description: "Our new product".to_string(),
        price: 8.9,
        category_id: CategoryId::new(3),
        category: Some("Toolbox".to_string()),
        quantity_in_stock: 30,
        search_key: Vec::new(),
        supplier_ids: Vec::new(),
    }
}
