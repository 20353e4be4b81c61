//! Batch partitioning.

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;

use super::operation::{AliasGrouping, Operation, OperationKind};

/// Remote-defined bounds on one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchLimits {
    /// Items in one call
    pub max_per_call: usize,
    /// Aliased sub-mutations in one call
    pub max_aliases: usize,
}

impl BatchLimits {
    /// Creates limits; zero is raised to one so every batch can hold an item.
    pub fn new(max_per_call: usize, max_aliases: usize) -> Self {
        Self {
            max_per_call: max_per_call.max(1),
            max_aliases: max_aliases.max(1),
        }
    }
}

/// An ordered, non-empty group of operations sent as one network call.
///
/// Cloning is cheap: the operations are shared, so a retry is the same
/// content under a new attempt number.
#[derive(Debug, Clone)]
pub struct Batch {
    index: usize,
    attempt: u32,
    operations: Arc<[Operation]>,
    aliases: Arc<[Range<usize>]>,
}

impl Batch {
    /// Position of this batch in its partitioning pass.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based attempt number.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation ranges, one per aliased sub-mutation, in order.
    pub fn aliases(&self) -> &[Range<usize>] {
        &self.aliases
    }

    pub fn kind(&self) -> Option<OperationKind> {
        self.operations.first().map(Operation::kind)
    }

    /// The same batch as its next attempt.
    pub fn next_attempt(&self) -> Batch {
        Batch {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// Splits `operations` into batches bounded by `limits`.
///
/// Deterministic and order-preserving: concatenating the batches yields the
/// input. A batch never mixes operation kinds. Empty input yields no batches.
pub fn partition(operations: Vec<Operation>, limits: BatchLimits) -> Vec<Batch> {
    let limits = BatchLimits::new(limits.max_per_call, limits.max_aliases);
    let mut batches = Vec::new();
    let mut current: Vec<Operation> = Vec::new();
    let mut aliases: Vec<Range<usize>> = Vec::new();

    for op in operations {
        let kind_changed = current
            .first()
            .is_some_and(|first| first.kind() != op.kind());
        if kind_changed {
            flush(&mut batches, &mut current, &mut aliases);
        }

        let opens_alias = match op.alias_grouping() {
            AliasGrouping::Shared => current.is_empty(),
            AliasGrouping::PerOperation => true,
            AliasGrouping::ByKey(key) => current
                .last()
                .map_or(true, |last| last.alias_grouping() != AliasGrouping::ByKey(key)),
        };

        let full = current.len() >= limits.max_per_call
            || (opens_alias && aliases.len() >= limits.max_aliases);
        // A flushed batch forces the next operation to open a fresh alias
        let opens_alias = if full {
            flush(&mut batches, &mut current, &mut aliases);
            true
        } else {
            opens_alias
        };

        let position = current.len();
        current.push(op);
        match aliases.last_mut() {
            Some(last) if !opens_alias => last.end = position + 1,
            _ => aliases.push(position..position + 1),
        }
    }
    flush(&mut batches, &mut current, &mut aliases);

    batches
}

fn flush(batches: &mut Vec<Batch>, current: &mut Vec<Operation>, aliases: &mut Vec<Range<usize>>) {
    if current.is_empty() {
        return;
    }
    batches.push(Batch {
        index: batches.len(),
        attempt: 1,
        operations: std::mem::take(current).into(),
        aliases: std::mem::take(aliases).into(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantity(i: usize) -> Operation {
        Operation::SetQuantity {
            inventory_item_id: format!("gid://shopify/InventoryItem/{}", i),
            location_id: "gid://shopify/Location/1".to_string(),
            quantity: i as i64,
        }
    }

    fn tracking(i: usize) -> Operation {
        Operation::EnableTracking {
            inventory_item_id: format!("gid://shopify/InventoryItem/{}", i),
        }
    }

    fn price(product: usize, variant: usize) -> Operation {
        Operation::UpdateVariantPrice {
            product_id: format!("gid://shopify/Product/{}", product),
            variant_id: format!("gid://shopify/ProductVariant/{}", variant),
            price: "100.00".to_string(),
        }
    }

    fn assert_exhaustive(input: &[Operation], batches: &[Batch]) {
        let flattened: Vec<Operation> = batches
            .iter()
            .flat_map(|b| b.operations().iter().cloned())
            .collect();
        assert_eq!(flattened, input);
        let total: usize = batches.iter().map(Batch::len).sum();
        assert_eq!(total, input.len());
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batches = partition(Vec::new(), BatchLimits::new(250, 100));
        assert!(batches.is_empty());
    }

    #[test]
    fn test_native_bulk_splits_on_per_call_limit() {
        let input: Vec<Operation> = (0..600).map(quantity).collect();
        let batches = partition(input.clone(), BatchLimits::new(250, 100));

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![250, 250, 100]);
        // The whole item array is one alias
        assert!(batches.iter().all(|b| b.aliases().len() == 1));
        assert_exhaustive(&input, &batches);
    }

    #[test]
    fn test_per_operation_aliases_split_on_alias_limit() {
        let input: Vec<Operation> = (0..250).map(tracking).collect();
        let batches = partition(input.clone(), BatchLimits::new(250, 100));

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(batches.iter().all(|b| b.aliases().len() == b.len()));
        assert_exhaustive(&input, &batches);
    }

    #[test]
    fn test_keyed_aliases_group_consecutive_operations() {
        // Product 1 has 3 variants, product 2 has 2, product 3 has 1
        let input = vec![price(1, 1), price(1, 2), price(1, 3), price(2, 4), price(2, 5), price(3, 6)];
        let batches = partition(input.clone(), BatchLimits::new(250, 2));

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].aliases(), &[0..3, 3..5]);
        assert_eq!(batches[1].aliases(), &[0..1]);
        assert_exhaustive(&input, &batches);
    }

    #[test]
    fn test_keyed_alias_split_across_batches_by_item_limit() {
        let input: Vec<Operation> = (0..300).map(|v| price(1, v)).collect();
        let batches = partition(input.clone(), BatchLimits::new(250, 1));

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![250, 50]);
        assert_exhaustive(&input, &batches);
    }

    #[test]
    fn test_kind_change_starts_new_batch() {
        let input = vec![quantity(1), quantity(2), tracking(3), quantity(4)];
        let batches = partition(input.clone(), BatchLimits::new(250, 100));

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].kind(), Some(OperationKind::SetQuantity));
        assert_eq!(batches[1].kind(), Some(OperationKind::EnableTracking));
        assert_eq!(batches[2].kind(), Some(OperationKind::SetQuantity));
        assert_exhaustive(&input, &batches);
    }

    #[test]
    fn test_limits_never_exceeded() {
        for (per_call, aliases) in [(1, 1), (7, 3), (250, 100), (10, 50)] {
            let mut input: Vec<Operation> = Vec::new();
            for i in 0..97 {
                input.push(match i % 3 {
                    0 => quantity(i),
                    1 => tracking(i),
                    _ => price(i / 10, i),
                });
            }
            let limits = BatchLimits::new(per_call, aliases);
            let batches = partition(input.clone(), limits);
            for batch in &batches {
                assert!(!batch.is_empty());
                assert!(batch.len() <= limits.max_per_call);
                assert!(batch.aliases().len() <= limits.max_aliases);
            }
            assert_exhaustive(&input, &batches);
        }
    }

    #[test]
    fn test_batch_indices_and_attempts() {
        let batches = partition((0..5).map(quantity).collect(), BatchLimits::new(2, 1));
        let indices: Vec<usize> = batches.iter().map(Batch::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(batches.iter().all(|b| b.attempt() == 1));

        let retry = batches[1].next_attempt();
        assert_eq!(retry.index(), 1);
        assert_eq!(retry.attempt(), 2);
        assert_eq!(retry.operations(), batches[1].operations());
    }

    #[test]
    fn test_zero_limits_are_raised_to_one() {
        let batches = partition((0..3).map(quantity).collect(), BatchLimits::new(0, 0));
        assert_eq!(batches.len(), 3);
    }
}
