//! GraphQL documents for every operation kind.
//!
//! Live mutations multiplex one batch into a single request: each alias group
//! becomes an `a{index}` field with its own variables, so the response maps
//! straight back to alias ranges of the batch. Bulk jobs instead run one
//! template mutation per JSONL line, with the line supplying the variables.

use serde_json::{json, Map, Value};

use crate::batch::{Batch, Operation, OperationKind};

/// Minimal-cost query used to refresh the throttle snapshot.
pub(crate) const PROBE_QUERY: &str = "{ shop { id } }";

pub(crate) const FIRST_LOCATION_QUERY: &str = r#"{
  locations(first: 1) {
    edges { node { id name } }
  }
}"#;

pub(crate) const PRODUCTS_PAGE_QUERY: &str = r#"query products($first: Int!, $query: String!, $after: String, $variantsFirst: Int!) {
  products(first: $first, query: $query, after: $after) {
    pageInfo { hasNextPage endCursor }
    edges {
      cursor
      node {
        id
        title
        variants(first: $variantsFirst) {
          edges { node { id inventoryItem { id } } }
        }
      }
    }
  }
}"#;

pub(crate) const CURRENT_BULK_OPERATION_QUERY: &str = r#"{
  currentBulkOperation(type: MUTATION) {
    id
    status
    errorCode
    objectCount
    url
    createdAt
    completedAt
  }
}"#;

pub(crate) const STAGED_UPLOADS_CREATE: &str = r#"mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets { url resourceUrl parameters { name value } }
    userErrors { field message }
  }
}"#;

pub(crate) const BULK_OPERATION_RUN_MUTATION: &str = r#"mutation bulkOperationRunMutation($mutation: String!, $stagedUploadPath: String!) {
  bulkOperationRunMutation(mutation: $mutation, stagedUploadPath: $stagedUploadPath) {
    bulkOperation { id status objectCount url createdAt }
    userErrors { field message }
  }
}"#;

const SET_QUANTITIES_TEMPLATE: &str = r#"mutation inventorySetQuantities($input: InventorySetQuantitiesInput!) {
  inventorySetQuantities(input: $input) {
    inventoryAdjustmentGroup { createdAt reason }
    userErrors { field message }
  }
}"#;

const SET_ON_HAND_TEMPLATE: &str = r#"mutation inventorySetOnHandQuantities($input: InventorySetOnHandQuantitiesInput!) {
  inventorySetOnHandQuantities(input: $input) {
    userErrors { field message }
  }
}"#;

const ENABLE_TRACKING_TEMPLATE: &str = r#"mutation inventoryItemUpdate($id: ID!, $input: InventoryItemInput!) {
  inventoryItemUpdate(id: $id, input: $input) {
    inventoryItem { id tracked }
    userErrors { field message }
  }
}"#;

const PRICE_UPDATE_TEMPLATE: &str = r#"mutation productVariantsBulkUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    productVariants { id price }
    userErrors { field message }
  }
}"#;

const PRODUCT_CREATE_TEMPLATE: &str = r#"mutation productCreate($input: ProductInput!) {
  productCreate(input: $input) {
    product { id }
    userErrors { field message }
  }
}"#;

/// Single-mutation template a bulk job runs once per payload line.
pub fn bulk_mutation_template(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::SetQuantity => SET_QUANTITIES_TEMPLATE,
        OperationKind::SetOnHandQuantity => SET_ON_HAND_TEMPLATE,
        OperationKind::EnableTracking => ENABLE_TRACKING_TEMPLATE,
        OperationKind::UpdateVariantPrice => PRICE_UPDATE_TEMPLATE,
        OperationKind::CreateProduct => PRODUCT_CREATE_TEMPLATE,
    }
}

/// Variables for one alias group, keyed by the template's variable names.
///
/// `group` must be non-empty and of a single kind; a batch alias range always is.
pub fn alias_variables(group: &[Operation]) -> Map<String, Value> {
    let mut vars = Map::new();
    let Some(first) = group.first() else {
        return vars;
    };
    match first {
        Operation::SetQuantity { .. } => {
            let quantities: Vec<Value> = group
                .iter()
                .filter_map(|op| match op {
                    Operation::SetQuantity {
                        inventory_item_id,
                        location_id,
                        quantity,
                    } => Some(json!({
                        "inventoryItemId": inventory_item_id,
                        "locationId": location_id,
                        "quantity": quantity,
                    })),
                    _ => None,
                })
                .collect();
            vars.insert(
                "input".into(),
                json!({
                    "name": "available",
                    "reason": "correction",
                    "ignoreCompareQuantity": true,
                    "quantities": quantities,
                }),
            );
        }
        Operation::SetOnHandQuantity { .. } => {
            let quantities: Vec<Value> = group
                .iter()
                .filter_map(|op| match op {
                    Operation::SetOnHandQuantity {
                        inventory_item_id,
                        location_id,
                        quantity,
                    } => Some(json!({
                        "inventoryItemId": inventory_item_id,
                        "locationId": location_id,
                        "quantity": quantity,
                    })),
                    _ => None,
                })
                .collect();
            vars.insert(
                "input".into(),
                json!({
                    "reason": "correction",
                    "setQuantities": quantities,
                }),
            );
        }
        Operation::EnableTracking { inventory_item_id } => {
            vars.insert("id".into(), json!(inventory_item_id));
            vars.insert("input".into(), json!({ "tracked": true }));
        }
        Operation::UpdateVariantPrice { product_id, .. } => {
            let variants: Vec<Value> = group
                .iter()
                .filter_map(|op| match op {
                    Operation::UpdateVariantPrice {
                        variant_id, price, ..
                    } => Some(json!({ "id": variant_id, "price": price })),
                    _ => None,
                })
                .collect();
            vars.insert("productId".into(), json!(product_id));
            vars.insert("variants".into(), Value::Array(variants));
        }
        Operation::CreateProduct(input) => {
            vars.insert("input".into(), json!(input));
        }
    }
    vars
}

/// Builds the aliased mutation document and its variables for one batch.
pub(crate) fn batch_document(batch: &Batch) -> (String, Value) {
    let mut declarations = Vec::new();
    let mut fields = Vec::new();
    let mut variables = Map::new();

    for (i, range) in batch.aliases().iter().enumerate() {
        let group = &batch.operations()[range.clone()];
        let Some(kind) = group.first().map(Operation::kind) else {
            continue;
        };
        let (decls, field) = match kind {
            OperationKind::SetQuantity => (
                vec![format!("$input{i}: InventorySetQuantitiesInput!")],
                format!(
                    "a{i}: inventorySetQuantities(input: $input{i}) {{ inventoryAdjustmentGroup {{ createdAt reason }} userErrors {{ field message }} }}"
                ),
            ),
            OperationKind::SetOnHandQuantity => (
                vec![format!("$input{i}: InventorySetOnHandQuantitiesInput!")],
                format!(
                    "a{i}: inventorySetOnHandQuantities(input: $input{i}) {{ userErrors {{ field message }} }}"
                ),
            ),
            OperationKind::EnableTracking => (
                vec![
                    format!("$id{i}: ID!"),
                    format!("$input{i}: InventoryItemInput!"),
                ],
                format!(
                    "a{i}: inventoryItemUpdate(id: $id{i}, input: $input{i}) {{ inventoryItem {{ id tracked }} userErrors {{ field message }} }}"
                ),
            ),
            OperationKind::UpdateVariantPrice => (
                vec![
                    format!("$productId{i}: ID!"),
                    format!("$variants{i}: [ProductVariantsBulkInput!]!"),
                ],
                format!(
                    "a{i}: productVariantsBulkUpdate(productId: $productId{i}, variants: $variants{i}) {{ productVariants {{ id price }} userErrors {{ field message }} }}"
                ),
            ),
            OperationKind::CreateProduct => (
                vec![format!("$input{i}: ProductInput!")],
                format!(
                    "a{i}: productCreate(input: $input{i}) {{ product {{ id }} userErrors {{ field message }} }}"
                ),
            ),
        };
        declarations.extend(decls);
        fields.push(field);
        for (name, value) in alias_variables(group) {
            variables.insert(format!("{name}{i}"), value);
        }
    }

    let document = format!(
        "mutation batch({}) {{\n{}\n}}",
        declarations.join(", "),
        fields.join("\n")
    );
    (document, Value::Object(variables))
}

/// Parses the alias index out of a response key such as `a17`.
pub(crate) fn alias_index(key: &str) -> Option<usize> {
    key.strip_prefix('a')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{partition, BatchLimits, ProductInput};

    #[test]
    fn test_set_quantity_batch_is_one_alias() {
        let ops: Vec<Operation> = (0..3)
            .map(|i| Operation::SetQuantity {
                inventory_item_id: format!("item-{i}"),
                location_id: "loc-1".to_string(),
                quantity: 5,
            })
            .collect();
        let batches = partition(ops, BatchLimits::new(250, 100));
        let (document, variables) = batch_document(&batches[0]);

        assert!(document.contains("a0: inventorySetQuantities(input: $input0)"));
        assert!(!document.contains("a1:"));
        assert_eq!(variables["input0"]["name"], "available");
        assert_eq!(variables["input0"]["ignoreCompareQuantity"], true);
        assert_eq!(variables["input0"]["quantities"].as_array().unwrap().len(), 3);
        assert_eq!(variables["input0"]["quantities"][2]["inventoryItemId"], "item-2");
    }

    #[test]
    fn test_on_hand_batch_uses_set_quantities_list() {
        let ops: Vec<Operation> = (0..4)
            .map(|i| Operation::SetOnHandQuantity {
                inventory_item_id: format!("item-{i}"),
                location_id: "loc-1".to_string(),
                quantity: 3,
            })
            .collect();
        let batches = partition(ops, BatchLimits::new(250, 100));
        let (document, variables) = batch_document(&batches[0]);

        assert!(document.contains("$input0: InventorySetOnHandQuantitiesInput!"));
        assert!(document.contains("a0: inventorySetOnHandQuantities(input: $input0)"));
        assert!(!document.contains("a1:"));
        assert_eq!(variables["input0"]["reason"], "correction");
        assert!(variables["input0"].get("name").is_none());
        let set = variables["input0"]["setQuantities"].as_array().unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set[3]["locationId"], "loc-1");
        assert_eq!(set[3]["quantity"], 3);
    }

    #[test]
    fn test_tracking_batch_has_alias_per_item() {
        let ops: Vec<Operation> = (0..2)
            .map(|i| Operation::EnableTracking {
                inventory_item_id: format!("item-{i}"),
            })
            .collect();
        let batches = partition(ops, BatchLimits::new(250, 100));
        let (document, variables) = batch_document(&batches[0]);

        assert!(document.starts_with("mutation batch($id0: ID!, $input0: InventoryItemInput!, $id1: ID!"));
        assert!(document.contains("a1: inventoryItemUpdate(id: $id1, input: $input1)"));
        assert_eq!(variables["id1"], "item-1");
        assert_eq!(variables["input0"]["tracked"], true);
    }

    #[test]
    fn test_price_batch_groups_variants_by_product() {
        let ops = vec![
            Operation::UpdateVariantPrice {
                product_id: "p1".into(),
                variant_id: "v1".into(),
                price: "100.00".into(),
            },
            Operation::UpdateVariantPrice {
                product_id: "p1".into(),
                variant_id: "v2".into(),
                price: "100.00".into(),
            },
        ];
        let batches = partition(ops, BatchLimits::new(250, 1));
        let (_, variables) = batch_document(&batches[0]);
        assert_eq!(variables["productId0"], "p1");
        assert_eq!(variables["variants0"][1]["id"], "v2");
    }

    #[test]
    fn test_product_create_line_variables() {
        let op = Operation::CreateProduct(ProductInput {
            title: "Dummy Product 1".into(),
            description_html: "<strong>Dummy description for product 1</strong>".into(),
            vendor: "DummyVendor".into(),
            product_type: "DummyType".into(),
        });
        let vars = alias_variables(std::slice::from_ref(&op));
        assert_eq!(vars["input"]["title"], "Dummy Product 1");
        assert_eq!(vars["input"]["productType"], "DummyType");
    }

    #[test]
    fn test_alias_index() {
        assert_eq!(alias_index("a0"), Some(0));
        assert_eq!(alias_index("a42"), Some(42));
        assert_eq!(alias_index("shop"), None);
        assert_eq!(alias_index("a"), None);
    }
}
