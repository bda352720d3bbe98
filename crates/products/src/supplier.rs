//! Suppliers (read-only reference data).

use apm_core::{Entity, SupplierId};
use serde::{Deserialize, Serialize};

use crate::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, rename = "minQuantity")]
    pub minimum_quantity: u32,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}

/// Suppliers listed on `product`, in supplier-list order.
///
/// Ids on the product that match no supplier are skipped.
pub fn suppliers_for(product: Option<&Product>, suppliers: &[Supplier]) -> Vec<Supplier> {
    let Some(product) = product else {
        return Vec::new();
    };

    suppliers
        .iter()
        .filter(|supplier| product.supplier_ids.contains(&supplier.id))
        .cloned()
        .collect()
}
