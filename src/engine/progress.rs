//! Live progress counters for running jobs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::throttle::ThrottleState;

/// Counters shared between the engine and the status endpoints.
///
/// Updated concurrently by every dispatch; readers see a best-effort view.
#[derive(Debug, Default)]
pub struct RunProgress {
    pub active_runs: AtomicUsize,
    pub completed_runs: AtomicUsize,
    pub rounds: AtomicUsize,
    pub batches_dispatched: AtomicUsize,
    pub batches_failed: AtomicUsize,
    pub items_attempted: AtomicUsize,
    pub items_updated: AtomicUsize,
    pub retries: AtomicUsize,
    pub stuck_cycles: AtomicUsize,
    pub current_parallelism: AtomicUsize,
    last_throttle: RwLock<Option<ThrottleState>>,
}

impl RunProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_throttle(&self, snapshot: ThrottleState) {
        *self
            .last_throttle
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Most recent throttle snapshot seen by any run.
    pub fn last_throttle(&self) -> Option<ThrottleState> {
        *self
            .last_throttle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Marks a run active for as long as it is alive.
pub(crate) struct ActiveRun<'a> {
    progress: &'a RunProgress,
}

impl<'a> ActiveRun<'a> {
    pub(crate) fn start(progress: &'a RunProgress) -> Self {
        progress.active_runs.fetch_add(1, Ordering::SeqCst);
        Self { progress }
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.progress.active_runs.fetch_sub(1, Ordering::SeqCst);
        self.progress.completed_runs.fetch_add(1, Ordering::SeqCst);
    }
}
