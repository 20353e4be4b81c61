//! Batch results and run reports.

use serde::Serialize;

use crate::batch::{Batch, OperationKind};
use crate::error_handling::ErrorType;
use crate::remote::UserError;
use crate::throttle::ThrottleState;

/// How one dispatched batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchOutcome {
    /// Every item was accepted.
    Success,
    /// The call was accepted but some items were rejected.
    PartialUserError,
    /// The remote refused the call for rate-limit reasons.
    ThrottleError,
    /// The call failed in transit or the remote answered with an error.
    TransportError,
}

impl BatchOutcome {
    /// Whether the remote accepted the call at all.
    pub fn is_accepted(self) -> bool {
        matches!(self, BatchOutcome::Success | BatchOutcome::PartialUserError)
    }
}

/// Result of one attempt of one batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    #[serde(skip)]
    pub batch: Batch,
    pub batch_index: usize,
    pub attempt: u32,
    pub items: usize,
    pub outcome: BatchOutcome,
    /// Items the remote accepted
    pub accepted_items: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_errors: Vec<UserError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<ThrottleState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub error_type: Option<ErrorType>,
}

impl BatchResult {
    pub(crate) fn new(batch: Batch, outcome: BatchOutcome) -> Self {
        Self {
            batch_index: batch.index(),
            attempt: batch.attempt(),
            items: batch.len(),
            accepted_items: 0,
            outcome,
            user_errors: Vec::new(),
            throttle: None,
            error: None,
            error_type: None,
            batch,
        }
    }
}

/// Aggregate of one adaptive run.
///
/// Partial failure is never hidden: every batch's final attempt is in
/// `results`, and the counts always add up to the input size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OperationKind>,
    /// Final attempt of every batch, ordered by batch index
    pub results: Vec<BatchResult>,
    pub elapsed_seconds: f64,
    /// Items the remote accepted
    pub updated_count: usize,
    pub attempted_items: usize,
    pub failed_items: usize,
    pub batches: usize,
    pub rounds: usize,
    pub retries: usize,
}

impl RunReport {
    pub(crate) fn empty(kind: Option<OperationKind>) -> Self {
        Self {
            kind,
            results: Vec::new(),
            elapsed_seconds: 0.0,
            updated_count: 0,
            attempted_items: 0,
            failed_items: 0,
            batches: 0,
            rounds: 0,
            retries: 0,
        }
    }

    /// Folds a settled round into the report.
    pub(crate) fn record_round(&mut self, results: Vec<BatchResult>) {
        self.rounds += 1;
        for result in results {
            self.batches += 1;
            self.attempted_items += result.items;
            self.updated_count += result.accepted_items;
            self.failed_items += result.items - result.accepted_items;
            self.results.push(result);
        }
    }

    /// Batches whose final attempt was not accepted.
    pub fn failed_batches(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.outcome.is_accepted())
            .count()
    }
}
