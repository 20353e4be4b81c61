//! Adaptive rate-limited batch execution.
//!
//! A run partitions its operations, then loops until the queue is empty:
//! 1. The controller sizes the next round from the projected throttle budget
//! 2. A drained budget enters the stuck state: probe, wait, recompute
//! 3. The dispatcher issues the round concurrently and feeds every throttle
//!    snapshot back into the tracker
//! 4. The retry governor serially re-issues eligible failures
//!
//! A round fully settles before the next decision is made, so each decision
//! sees the freshest snapshot.

mod controller;
mod dispatcher;
mod progress;
mod result;
mod retry;
mod scheduler;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::time::Instant;

use crate::batch::{partition, BatchLimits, Operation};
use crate::config::EngineConfig;
use crate::error_handling::{EngineError, ErrorType, ProcessingStats};
use crate::remote::RemoteApi;
use crate::throttle::ThrottleTracker;

pub use controller::{next_round_size, ConcurrencyController, RoundDecision};
pub use dispatcher::Dispatcher;
pub use progress::RunProgress;
pub use result::{BatchOutcome, BatchResult, RunReport};
pub use retry::RetryGovernor;
pub use scheduler::{Cancelled, Scheduler, TokioScheduler};

use progress::ActiveRun;

/// Drives operation lists through a [`RemoteApi`] under its throttle budget.
///
/// Each run gets its own [`ThrottleTracker`], discarded when the run ends.
/// Stats and progress counters are shared across runs.
#[derive(Clone)]
pub struct Engine {
    remote: Arc<dyn RemoteApi>,
    config: EngineConfig,
    scheduler: Arc<dyn Scheduler>,
    stats: Arc<ProcessingStats>,
    progress: Arc<RunProgress>,
}

impl Engine {
    pub fn new(remote: Arc<dyn RemoteApi>, config: EngineConfig) -> Self {
        Self {
            remote,
            config,
            scheduler: Arc::new(TokioScheduler::new()),
            stats: Arc::new(ProcessingStats::new()),
            progress: Arc::new(RunProgress::new()),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_stats(mut self, stats: Arc<ProcessingStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_progress(mut self, progress: Arc<RunProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn remote(&self) -> &Arc<dyn RemoteApi> {
        &self.remote
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    pub fn progress(&self) -> &Arc<RunProgress> {
        &self.progress
    }

    /// Runs `operations` to completion, starting from a probed budget.
    ///
    /// Per-batch failures are collected into the report. Only a budget that
    /// never recovers, a run in which every batch failed, or cancellation
    /// fail the whole run.
    pub async fn run_adaptive_batch(
        &self,
        operations: Vec<Operation>,
        limits: BatchLimits,
        per_call_cost: f64,
    ) -> Result<RunReport, EngineError> {
        let tracker = ThrottleTracker::new();
        match tracker.probe(self.remote.as_ref()).await {
            Ok(Some(_)) => {}
            Ok(None) => log::debug!("Initial probe carried no throttle status; assuming defaults"),
            Err(e) => log::warn!("Initial throttle probe failed, assuming defaults: {}", e),
        }
        self.run_with_tracker(&tracker, operations, limits, per_call_cost)
            .await
    }

    /// Runs `operations` against an existing tracker without an initial probe.
    pub async fn run_with_tracker(
        &self,
        tracker: &ThrottleTracker,
        operations: Vec<Operation>,
        limits: BatchLimits,
        per_call_cost: f64,
    ) -> Result<RunReport, EngineError> {
        if !per_call_cost.is_finite() || per_call_cost <= 0.0 {
            return Err(EngineError::InvalidCost(per_call_cost));
        }

        let start = Instant::now();
        let kind = operations.first().map(Operation::kind);
        let label = kind.map(|k| k.as_str()).unwrap_or("EMPTY");
        let total_items = operations.len();
        let mut report = RunReport::empty(kind);
        if operations.is_empty() {
            log::info!("{}: no operations to run", label);
            return Ok(report);
        }

        let _active = ActiveRun::start(&self.progress);
        let mut queue: VecDeque<_> = partition(operations, limits).into();
        let total_batches = queue.len();
        log::info!(
            "{}: {} items in {} batches (max {} per call, {} aliases)",
            label,
            total_items,
            total_batches,
            limits.max_per_call,
            limits.max_aliases
        );

        let dispatcher = Dispatcher::new(
            self.remote.as_ref(),
            tracker,
            &self.stats,
            &self.progress,
        );
        let governor = RetryGovernor::new(&self.config, self.scheduler.as_ref(), &self.stats);
        let mut controller = ConcurrencyController::new(self.config.clone(), per_call_cost);
        let mut stuck_cycles: u32 = 0;

        while !queue.is_empty() {
            if self.scheduler.is_cancelled() {
                return Err(EngineError::Cancelled {
                    completed_items: report.updated_count,
                });
            }

            let budget = tracker.projected_budget();
            match controller.decide(queue.len(), &budget) {
                RoundDecision::Stuck => {
                    stuck_cycles += 1;
                    self.stats.increment_error(ErrorType::StuckCycle);
                    RunProgress::add(&self.progress.stuck_cycles, 1);
                    if stuck_cycles > self.config.max_stuck_cycles {
                        log::error!("Stuck waiting for query cost to restore. Aborting.");
                        return Err(EngineError::Stuck {
                            cycles: stuck_cycles,
                            available: budget.currently_available,
                            per_call_cost,
                            completed_items: report.updated_count,
                        });
                    }
                    log::warn!(
                        "Not enough query cost. Current: {}, Needed: {}. Waiting...",
                        budget.currently_available,
                        per_call_cost
                    );
                    if let Err(e) = tracker.probe(self.remote.as_ref()).await {
                        log::warn!("Throttle probe failed: {}", e);
                    }
                    self.scheduler
                        .sleep(self.config.stuck_delay)
                        .await
                        .map_err(|Cancelled| EngineError::Cancelled {
                            completed_items: report.updated_count,
                        })?;
                }
                RoundDecision::Dispatch {
                    batches,
                    max_parallel,
                    ..
                } => {
                    stuck_cycles = 0;
                    self.progress
                        .current_parallelism
                        .store(max_parallel, std::sync::atomic::Ordering::Relaxed);

                    let round: Vec<_> = queue.drain(..batches).collect();
                    let items: usize = round.iter().map(|b| b.len()).sum();
                    // Spend the estimate now; the responses overwrite it
                    tracker.debit(batches as f64 * per_call_cost);
                    log::info!(
                        "[{}] Round {}: {} batches, {} items ({} batches remaining)",
                        label,
                        report.rounds + 1,
                        batches,
                        items,
                        queue.len()
                    );

                    let round_start = Instant::now();
                    let mut results = dispatcher.dispatch_round(round).await;
                    report.retries += governor
                        .resolve(&dispatcher, &mut results, &self.progress)
                        .await
                        .map_err(|Cancelled| EngineError::Cancelled {
                            completed_items: report.updated_count,
                        })?;
                    log::debug!(
                        "[TIMING] {}_ROUND_{}: {:.2}s",
                        label,
                        report.rounds + 1,
                        round_start.elapsed().as_secs_f64()
                    );

                    RunProgress::add(&self.progress.rounds, 1);
                    RunProgress::add(&self.progress.items_attempted, items);
                    report.record_round(results);
                }
            }
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        log::info!(
            "[TIMING] {}: {:.2}s ({} items, {} updated, {} failed, {} rounds, {} retries)",
            label,
            report.elapsed_seconds,
            report.attempted_items,
            report.updated_count,
            report.failed_items,
            report.rounds,
            report.retries
        );

        // Exhausted throttle rejections leave the run intact; the report
        // carries them as failed items
        let all_transport = report
            .results
            .iter()
            .all(|r| r.outcome == BatchOutcome::TransportError);
        if all_transport {
            let last_error = report
                .results
                .iter()
                .rev()
                .find_map(|r| r.error.clone())
                .unwrap_or_default();
            return Err(EngineError::AllBatchesFailed {
                batches: report.batches,
                last_error,
            });
        }
        Ok(report)
    }
}
