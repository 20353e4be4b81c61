//! Batch dispatcher.

use std::collections::HashSet;

use futures::stream::{FuturesUnordered, StreamExt};

use super::progress::RunProgress;
use super::result::{BatchOutcome, BatchResult};
use crate::batch::Batch;
use crate::error_handling::{ErrorType, ProcessingStats, RemoteError};
use crate::remote::{ExecuteResponse, RemoteApi};
use crate::throttle::ThrottleTracker;

/// Issues batches against the remote and interprets what comes back.
///
/// Every response's throttle block reaches the tracker before the result is
/// returned, whether the call succeeded or not.
pub struct Dispatcher<'a> {
    remote: &'a dyn RemoteApi,
    tracker: &'a ThrottleTracker,
    stats: &'a ProcessingStats,
    progress: &'a RunProgress,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        remote: &'a dyn RemoteApi,
        tracker: &'a ThrottleTracker,
        stats: &'a ProcessingStats,
        progress: &'a RunProgress,
    ) -> Self {
        Self {
            remote,
            tracker,
            stats,
            progress,
        }
    }

    /// Issues every batch concurrently and waits for all of them.
    ///
    /// Results come back ordered by batch index.
    pub async fn dispatch_round(&self, batches: Vec<Batch>) -> Vec<BatchResult> {
        let mut in_flight: FuturesUnordered<_> =
            batches.into_iter().map(|b| self.dispatch_one(b)).collect();

        let mut results = Vec::with_capacity(in_flight.len());
        while let Some(result) = in_flight.next().await {
            results.push(result);
        }
        results.sort_by_key(|r| r.batch_index);
        results
    }

    /// Issues one batch as one network call.
    pub async fn dispatch_one(&self, batch: Batch) -> BatchResult {
        RunProgress::add(&self.progress.batches_dispatched, 1);
        let outcome = self.remote.execute(&batch).await;
        match outcome {
            Ok(response) => self.accepted(batch, response),
            Err(error) => self.rejected(batch, error),
        }
    }

    fn accepted(&self, batch: Batch, response: ExecuteResponse) -> BatchResult {
        if let Some(snapshot) = response.throttle {
            self.tracker.observe(snapshot);
            self.progress.record_throttle(snapshot);
        }

        let accepted_items = accepted_items(&batch, &response);
        let outcome = if response.user_errors.is_empty() {
            BatchOutcome::Success
        } else {
            for error in &response.user_errors {
                log::error!(
                    "Batch {} alias {} userErrors: {} (field: {})",
                    batch.index(),
                    error
                        .alias
                        .map(|a| format!("a{}", a))
                        .unwrap_or_else(|| "-".to_string()),
                    error.message,
                    error.field.join(".")
                );
            }
            self.stats
                .add_errors(ErrorType::UserError, response.user_errors.len());
            BatchOutcome::PartialUserError
        };

        RunProgress::add(&self.progress.items_updated, accepted_items);
        let mut result = BatchResult::new(batch, outcome);
        result.accepted_items = accepted_items;
        result.user_errors = response.user_errors;
        result.throttle = response.throttle;
        result
    }

    fn rejected(&self, batch: Batch, error: RemoteError) -> BatchResult {
        let throttle = error.throttle();
        if let Some(snapshot) = throttle {
            self.tracker.observe(snapshot);
            self.progress.record_throttle(snapshot);
        }

        let error_type = error.error_type();
        self.stats.increment_error(error_type);
        RunProgress::add(&self.progress.batches_failed, 1);

        let outcome = if error.is_throttle() {
            log::error!("Throttle error on batch {} (attempt {})", batch.index(), batch.attempt());
            BatchOutcome::ThrottleError
        } else {
            log::error!(
                "Batch {} request error (attempt {}): {}",
                batch.index(),
                batch.attempt(),
                error
            );
            BatchOutcome::TransportError
        };

        let mut result = BatchResult::new(batch, outcome);
        result.throttle = throttle;
        result.error = Some(error.to_string());
        result.error_type = Some(error_type);
        result
    }
}

/// Items outside every alias that reported a user error.
///
/// A user error that cannot be tied to an alias rejects the whole batch.
fn accepted_items(batch: &Batch, response: &ExecuteResponse) -> usize {
    if response.user_errors.iter().any(|e| e.alias.is_none()) {
        return 0;
    }
    let rejected: HashSet<usize> = response
        .user_errors
        .iter()
        .filter_map(|e| e.alias)
        .collect();
    batch
        .aliases()
        .iter()
        .enumerate()
        .filter(|(i, _)| !rejected.contains(i))
        .map(|(_, range)| range.len())
        .sum()
}
