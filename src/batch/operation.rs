//! Operation data model.

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::config::{
    ENABLE_TRACKING_ALIAS_COST, MAX_ALIASES_PER_CALL, MAX_ITEMS_PER_CALL,
    PRICE_UPDATE_ALIAS_COST, PRODUCT_CREATE_ALIAS_COST, SET_ON_HAND_ALIAS_COST,
    SET_QUANTITY_ALIAS_COST,
};

use super::partition::BatchLimits;

/// Fields of a product to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    pub description_html: String,
    pub vendor: String,
    pub product_type: String,
}

/// One unit of work. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Set the available quantity of an inventory item at a location.
    SetQuantity {
        inventory_item_id: String,
        location_id: String,
        quantity: i64,
    },
    /// Set the on-hand quantity of an inventory item at a location.
    SetOnHandQuantity {
        inventory_item_id: String,
        location_id: String,
        quantity: i64,
    },
    /// Turn on inventory tracking for an inventory item.
    EnableTracking { inventory_item_id: String },
    /// Set the price of one variant of a product.
    UpdateVariantPrice {
        product_id: String,
        variant_id: String,
        price: String,
    },
    /// Create a product.
    CreateProduct(ProductInput),
}

/// How operations of one kind map onto aliased sub-mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasGrouping<'a> {
    /// The whole batch travels as one item array under a single alias.
    Shared,
    /// Every operation is its own alias.
    PerOperation,
    /// Consecutive operations with the same key share an alias.
    ByKey(&'a str),
}

/// Operation kinds, each with fixed remote limits and cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    SetQuantity,
    SetOnHandQuantity,
    EnableTracking,
    UpdateVariantPrice,
    CreateProduct,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::SetQuantity { .. } => OperationKind::SetQuantity,
            Operation::SetOnHandQuantity { .. } => OperationKind::SetOnHandQuantity,
            Operation::EnableTracking { .. } => OperationKind::EnableTracking,
            Operation::UpdateVariantPrice { .. } => OperationKind::UpdateVariantPrice,
            Operation::CreateProduct(_) => OperationKind::CreateProduct,
        }
    }

    pub fn alias_grouping(&self) -> AliasGrouping<'_> {
        match self {
            Operation::SetQuantity { .. } | Operation::SetOnHandQuantity { .. } => {
                AliasGrouping::Shared
            }
            Operation::EnableTracking { .. } | Operation::CreateProduct(_) => {
                AliasGrouping::PerOperation
            }
            Operation::UpdateVariantPrice { product_id, .. } => AliasGrouping::ByKey(product_id),
        }
    }
}

impl OperationKind {
    /// Estimated query cost of one aliased sub-mutation of this kind.
    pub fn alias_cost(self) -> f64 {
        match self {
            OperationKind::SetQuantity => SET_QUANTITY_ALIAS_COST,
            OperationKind::SetOnHandQuantity => SET_ON_HAND_ALIAS_COST,
            OperationKind::EnableTracking => ENABLE_TRACKING_ALIAS_COST,
            OperationKind::UpdateVariantPrice => PRICE_UPDATE_ALIAS_COST,
            OperationKind::CreateProduct => PRODUCT_CREATE_ALIAS_COST,
        }
    }

    /// Remote limits used for live dispatch of this kind.
    ///
    /// Price updates go out one product per call: the per-product mutation is
    /// the expensive one and packing several into one request makes a single
    /// throttle rejection cost more work.
    pub fn default_limits(self) -> BatchLimits {
        match self {
            OperationKind::UpdateVariantPrice => BatchLimits::new(MAX_ITEMS_PER_CALL, 1),
            _ => BatchLimits::new(MAX_ITEMS_PER_CALL, MAX_ALIASES_PER_CALL),
        }
    }

    /// Estimated cost of one full call under `limits`.
    pub fn per_call_cost(self, limits: BatchLimits) -> f64 {
        let aliases = match self {
            OperationKind::SetQuantity | OperationKind::SetOnHandQuantity => 1,
            _ => limits.max_aliases.min(limits.max_per_call),
        };
        self.alias_cost() * aliases as f64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::SetQuantity => "SET_QUANTITY",
            OperationKind::SetOnHandQuantity => "SET_ONHAND",
            OperationKind::EnableTracking => "ENABLE_TRACKING",
            OperationKind::UpdateVariantPrice => "PRICE_UPDATE",
            OperationKind::CreateProduct => "PRODUCT_CREATE",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_call_cost() {
        let quantity = OperationKind::SetQuantity;
        assert_eq!(quantity.per_call_cost(quantity.default_limits()), 10.0);

        let on_hand = OperationKind::SetOnHandQuantity;
        assert_eq!(on_hand.per_call_cost(on_hand.default_limits()), 10.0);

        let tracking = OperationKind::EnableTracking;
        assert_eq!(tracking.per_call_cost(tracking.default_limits()), 1000.0);

        let price = OperationKind::UpdateVariantPrice;
        assert_eq!(price.per_call_cost(price.default_limits()), 50.0);
    }

    #[test]
    fn test_operation_serializes_with_kind_tag() {
        let op = Operation::EnableTracking {
            inventory_item_id: "gid://shopify/InventoryItem/1".to_string(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "enable_tracking");
        assert_eq!(json["inventory_item_id"], "gid://shopify/InventoryItem/1");
    }

    #[test]
    fn test_alias_grouping() {
        let price = Operation::UpdateVariantPrice {
            product_id: "p1".into(),
            variant_id: "v1".into(),
            price: "1.00".into(),
        };
        assert_eq!(price.alias_grouping(), AliasGrouping::ByKey("p1"));

        let quantity = Operation::SetQuantity {
            inventory_item_id: "i".into(),
            location_id: "l".into(),
            quantity: 1,
        };
        assert_eq!(quantity.alias_grouping(), AliasGrouping::Shared);

        let on_hand = Operation::SetOnHandQuantity {
            inventory_item_id: "i".into(),
            location_id: "l".into(),
            quantity: 1,
        };
        assert_eq!(on_hand.alias_grouping(), AliasGrouping::Shared);
        assert_ne!(on_hand.kind(), quantity.kind());
    }
}
