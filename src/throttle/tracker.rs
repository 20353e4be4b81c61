//! Throttle state tracker.

use std::sync::{PoisonError, RwLock};

use tokio::time::Instant;

use super::state::ThrottleState;
use crate::error_handling::RemoteError;
use crate::remote::RemoteApi;

#[derive(Debug, Clone, Copy)]
struct Observed {
    state: ThrottleState,
    at: Instant,
}

/// Holds the last known bucket state for one run.
///
/// Updates are last-writer-wins. The lock only guards the copy of the
/// snapshot, so concurrent dispatches can report feedback without coordination.
#[derive(Debug)]
pub struct ThrottleTracker {
    inner: RwLock<Observed>,
}

impl ThrottleTracker {
    /// Creates a tracker that assumes a near-full bucket.
    pub fn new() -> Self {
        Self::with_state(ThrottleState::default())
    }

    /// Creates a tracker seeded with a known snapshot.
    pub fn with_state(state: ThrottleState) -> Self {
        ThrottleTracker {
            inner: RwLock::new(Observed {
                state,
                at: Instant::now(),
            }),
        }
    }

    /// Ingests a snapshot reported by the remote, overwriting the tracked state.
    pub fn observe(&self, snapshot: ThrottleState) {
        log::debug!(
            "[THROTTLE] max: {}, current: {}, restoreRate: {}",
            snapshot.maximum_available,
            snapshot.currently_available,
            snapshot.restore_rate
        );
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *inner = Observed {
            state: snapshot,
            at: Instant::now(),
        };
    }

    /// Returns the last tracked snapshot as-is.
    pub fn budget(&self) -> ThrottleState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Returns the last snapshot plus the points restored since it was taken.
    pub fn projected_budget(&self) -> ThrottleState {
        let inner = *self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .state
            .restored_after(inner.at.elapsed().as_secs_f64())
    }

    /// Spends a round's estimated cost ahead of the remote's feedback.
    ///
    /// The restoration accrued so far is folded in first, so the next
    /// projection does not count it twice.
    pub fn debit(&self, points: f64) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let projected = inner.state.restored_after(inner.at.elapsed().as_secs_f64());
        *inner = Observed {
            state: projected.debited(points),
            at: Instant::now(),
        };
    }

    /// Issues a minimal-cost call to refresh the snapshot.
    ///
    /// Returns the snapshot if the remote reported one. A probe that carries no
    /// throttle block leaves the tracked state untouched.
    pub async fn probe(&self, remote: &dyn RemoteApi) -> Result<Option<ThrottleState>, RemoteError> {
        let snapshot = remote.probe_throttle().await?;
        if let Some(state) = snapshot {
            self.observe(state);
        }
        Ok(snapshot)
    }
}

impl Default for ThrottleTracker {
    fn default() -> Self {
        Self::new()
    }
}
