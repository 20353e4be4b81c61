//! Retry governor.

use super::dispatcher::Dispatcher;
use super::progress::RunProgress;
use super::result::{BatchOutcome, BatchResult};
use super::scheduler::{Cancelled, Scheduler};
use crate::config::EngineConfig;
use crate::error_handling::{ErrorType, ProcessingStats};

/// Decides which failed batches of a round are re-issued.
pub struct RetryGovernor<'a> {
    config: &'a EngineConfig,
    scheduler: &'a dyn Scheduler,
    stats: &'a ProcessingStats,
}

impl<'a> RetryGovernor<'a> {
    pub fn new(
        config: &'a EngineConfig,
        scheduler: &'a dyn Scheduler,
        stats: &'a ProcessingStats,
    ) -> Self {
        Self {
            config,
            scheduler,
            stats,
        }
    }

    /// Positions in `results` of the batches eligible for another attempt.
    ///
    /// Throttle rejections always qualify. Transport failures qualify only
    /// when some result in the round reported a budget under the low-water
    /// mark. User errors and GraphQL errors never do: they would fail again.
    /// Batches already at `max_attempts` are left out.
    pub fn triage_failures(&self, results: &[BatchResult]) -> Vec<usize> {
        let low_water = results.iter().any(|r| {
            r.throttle
                .is_some_and(|t| t.is_below(self.config.low_water_mark))
        });

        results
            .iter()
            .enumerate()
            .filter(|(_, r)| match r.outcome {
                BatchOutcome::ThrottleError => true,
                BatchOutcome::TransportError => low_water && is_transient(r.error_type),
                BatchOutcome::Success | BatchOutcome::PartialUserError => false,
            })
            .filter(|(_, r)| r.attempt < self.config.max_attempts)
            .map(|(i, _)| i)
            .collect()
    }

    /// Re-issues eligible batches one at a time, with a fixed delay before each.
    ///
    /// Passes repeat until nothing is eligible; the attempt cap bounds them.
    /// Each retried result replaces its predecessor in place. Returns the
    /// number of retries issued.
    pub async fn resolve(
        &self,
        dispatcher: &Dispatcher<'_>,
        results: &mut [BatchResult],
        progress: &RunProgress,
    ) -> Result<usize, Cancelled> {
        let mut retries = 0;
        loop {
            let eligible = self.triage_failures(results);
            if eligible.is_empty() {
                break;
            }
            log::warn!(
                "Throttle warning or error detected. Retrying {} failed batches with delay.",
                eligible.len()
            );
            for position in eligible {
                self.scheduler.sleep(self.config.retry_delay).await?;
                let next = results[position].batch.next_attempt();
                log::warn!(
                    "Retrying batch {} (attempt {}/{})",
                    next.index(),
                    next.attempt(),
                    self.config.max_attempts
                );
                results[position] = dispatcher.dispatch_one(next).await;
                retries += 1;
                RunProgress::add(&progress.retries, 1);
            }
        }

        for result in results.iter().filter(|r| !r.outcome.is_accepted()) {
            if result.attempt >= self.config.max_attempts {
                log::error!(
                    "Batch {} still failing after {} attempts",
                    result.batch_index,
                    result.attempt
                );
                self.stats.increment_error(ErrorType::RetryExhausted);
            }
        }
        Ok(retries)
    }
}

fn is_transient(error_type: Option<ErrorType>) -> bool {
    matches!(
        error_type,
        Some(
            ErrorType::HttpStatus
                | ErrorType::HttpTimeout
                | ErrorType::HttpConnect
                | ErrorType::HttpOther
        )
    )
}
