//! Snapshot data structures.

use serde::{Deserialize, Serialize};

/// A product variant with the inventory item that backs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub inventory_item_id: String,
}

/// A product and its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// On-disk snapshot: the product universe plus when it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Unix timestamp in milliseconds
    pub saved_at: i64,
    pub products: Vec<Product>,
}

impl Snapshot {
    /// Total number of variants across all products.
    pub fn variant_count(&self) -> usize {
        self.products.iter().map(|p| p.variants.len()).sum()
    }
}
