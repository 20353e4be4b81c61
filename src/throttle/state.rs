//! Throttle snapshot type.

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_CURRENTLY_AVAILABLE, DEFAULT_MAXIMUM_AVAILABLE, DEFAULT_RESTORE_RATE,
};

/// One snapshot of the remote leaky bucket.
///
/// Field names follow the remote's `throttleStatus` block so a snapshot can be
/// deserialized straight out of a response's `extensions.cost`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleState {
    /// Bucket capacity in points
    pub maximum_available: f64,
    /// Points currently available
    pub currently_available: f64,
    /// Points restored per second
    pub restore_rate: f64,
}

impl ThrottleState {
    pub fn new(maximum_available: f64, currently_available: f64, restore_rate: f64) -> Self {
        Self {
            maximum_available,
            currently_available,
            restore_rate,
        }
    }

    /// Returns the snapshot after `elapsed_secs` of restoration, capped at capacity.
    pub fn restored_after(&self, elapsed_secs: f64) -> Self {
        let restored = self.currently_available + self.restore_rate.max(0.0) * elapsed_secs;
        Self {
            currently_available: restored.min(self.maximum_available).max(0.0),
            ..*self
        }
    }

    /// Returns the snapshot with `points` spent, never dropping below zero.
    pub fn debited(&self, points: f64) -> Self {
        Self {
            currently_available: (self.currently_available - points).max(0.0),
            ..*self
        }
    }

    /// Whether the available budget is under `mark`.
    pub fn is_below(&self, mark: f64) -> bool {
        self.currently_available < mark
    }
}

impl Default for ThrottleState {
    /// Conservative starting point: assume a near-full bucket.
    fn default() -> Self {
        Self::new(
            DEFAULT_MAXIMUM_AVAILABLE,
            DEFAULT_CURRENTLY_AVAILABLE,
            DEFAULT_RESTORE_RATE,
        )
    }
}
