//! Operation list builders.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use crate::batch::{Operation, ProductInput};
use crate::config::MAX_RANDOM_QUANTITY;
use crate::snapshot::Product;

/// Title prefix of generated products.
pub const PRODUCT_TITLE_PREFIX: &str = "Dummy Product";

/// One tracking update per inventory item.
pub fn tracking_operations(products: &[Product]) -> Vec<Operation> {
    products
        .iter()
        .flat_map(|p| &p.variants)
        .map(|v| Operation::EnableTracking {
            inventory_item_id: v.inventory_item_id.clone(),
        })
        .collect()
}

/// One available-quantity update per inventory item at `location_id`.
///
/// Uses `quantity` for every item when given, otherwise a random quantity in
/// `1..=MAX_RANDOM_QUANTITY` per item.
pub fn quantity_operations(
    products: &[Product],
    location_id: &str,
    quantity: Option<i64>,
) -> Vec<Operation> {
    item_quantities(products, quantity)
        .map(|(item, quantity)| Operation::SetQuantity {
            inventory_item_id: item.to_string(),
            location_id: location_id.to_string(),
            quantity,
        })
        .collect()
}

/// One on-hand quantity update per inventory item at `location_id`.
///
/// Quantities are chosen as in [`quantity_operations`].
pub fn on_hand_operations(
    products: &[Product],
    location_id: &str,
    quantity: Option<i64>,
) -> Vec<Operation> {
    item_quantities(products, quantity)
        .map(|(item, quantity)| Operation::SetOnHandQuantity {
            inventory_item_id: item.to_string(),
            location_id: location_id.to_string(),
            quantity,
        })
        .collect()
}

fn item_quantities(
    products: &[Product],
    quantity: Option<i64>,
) -> impl Iterator<Item = (&str, i64)> {
    let mut rng = rand::rng();
    products.iter().flat_map(|p| &p.variants).map(move |v| {
        (
            v.inventory_item_id.as_str(),
            quantity.unwrap_or_else(|| rng.random_range(1..=MAX_RANDOM_QUANTITY)),
        )
    })
}

/// One price update per variant, grouped by product in snapshot order.
pub fn price_operations(products: &[Product], price: &str) -> Vec<Operation> {
    products
        .iter()
        .flat_map(|p| {
            p.variants.iter().map(move |v| Operation::UpdateVariantPrice {
                product_id: p.id.clone(),
                variant_id: v.id.clone(),
                price: price.to_string(),
            })
        })
        .collect()
}

/// `count` generated products numbered from `start`.
pub fn product_create_operations(start: u64, count: usize) -> Vec<Operation> {
    (0..count as u64)
        .map(|i| {
            let n = start + i;
            Operation::CreateProduct(ProductInput {
                title: format!("{} {}", PRODUCT_TITLE_PREFIX, n),
                description_html: format!("<strong>Dummy description for product {}</strong>", n),
                vendor: "DummyVendor".to_string(),
                product_type: "DummyType".to_string(),
            })
        })
        .collect()
}

/// First free product number: one past the highest numbered title.
pub fn next_product_number(products: &[Product]) -> u64 {
    static NUMBERED: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(numbered) = NUMBERED
        .get_or_init(|| Regex::new(&format!(r"{} (\d+)", PRODUCT_TITLE_PREFIX)).ok())
        .as_ref()
    else {
        return 1;
    };

    products
        .iter()
        .filter_map(|p| numbered.captures(&p.title))
        .filter_map(|c| c.get(1)?.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::OperationKind;
    use crate::snapshot::Variant;

    fn product(id: &str, title: &str, variants: usize) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            variants: (0..variants)
                .map(|i| Variant {
                    id: format!("{}-v{}", id, i),
                    inventory_item_id: format!("{}-i{}", id, i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_tracking_one_per_inventory_item() {
        let products = vec![product("p1", "A", 2), product("p2", "B", 3)];
        let ops = tracking_operations(&products);
        assert_eq!(ops.len(), 5);
        assert!(ops.iter().all(|o| o.kind() == OperationKind::EnableTracking));
    }

    #[test]
    fn test_random_quantities_in_range() {
        let products = vec![product("p1", "A", 200)];
        for op in quantity_operations(&products, "loc", None) {
            match op {
                Operation::SetQuantity { quantity, location_id, .. } => {
                    assert!((1..=MAX_RANDOM_QUANTITY).contains(&quantity));
                    assert_eq!(location_id, "loc");
                }
                other => panic!("unexpected operation {:?}", other),
            }
        }
    }

    #[test]
    fn test_fixed_quantity() {
        let products = vec![product("p1", "A", 2)];
        let ops = quantity_operations(&products, "loc", Some(7));
        assert!(ops
            .iter()
            .all(|o| matches!(o, Operation::SetQuantity { quantity: 7, .. })));
    }

    #[test]
    fn test_on_hand_operations_cover_every_item() {
        let products = vec![product("p1", "A", 2), product("p2", "B", 1)];
        let ops = on_hand_operations(&products, "loc", Some(9));
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[2],
            Operation::SetOnHandQuantity {
                inventory_item_id: "p2-i0".to_string(),
                location_id: "loc".to_string(),
                quantity: 9,
            }
        );
        for op in on_hand_operations(&products, "loc", None) {
            match op {
                Operation::SetOnHandQuantity { quantity, .. } => {
                    assert!((1..=MAX_RANDOM_QUANTITY).contains(&quantity))
                }
                other => panic!("unexpected operation {:?}", other),
            }
        }
    }

    #[test]
    fn test_price_operations_keep_product_order() {
        let products = vec![product("p1", "A", 2), product("p2", "B", 1)];
        let ops = price_operations(&products, "100.00");
        let ids: Vec<&str> = ops
            .iter()
            .map(|o| match o {
                Operation::UpdateVariantPrice { product_id, .. } => product_id.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(ids, vec!["p1", "p1", "p2"]);
    }

    #[test]
    fn test_next_product_number() {
        let products = vec![
            product("p1", "Dummy Product 12", 0),
            product("p2", "Dummy Product 104", 0),
            product("p3", "Something else 999", 0),
        ];
        assert_eq!(next_product_number(&products), 105);
        assert_eq!(next_product_number(&[]), 1);
    }

    #[test]
    fn test_product_create_numbering() {
        let ops = product_create_operations(105, 2);
        match &ops[1] {
            Operation::CreateProduct(input) => {
                assert_eq!(input.title, "Dummy Product 106");
                assert_eq!(input.vendor, "DummyVendor");
            }
            other => panic!("unexpected operation {:?}", other),
        }
    }
}
