//! Adaptive concurrency controller.

use crate::config::EngineConfig;
use crate::throttle::ThrottleState;

/// What the next round may do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundDecision {
    /// Issue `batches` calls concurrently.
    Dispatch {
        /// Calls to issue this round (never more than remain)
        batches: usize,
        /// Parallelism the budget allows, before capping at the remaining work
        max_parallel: usize,
        /// Budget expected to be left once the round's estimated cost is spent
        available_after: f64,
    },
    /// Not even one call is affordable: probe, wait, recompute.
    Stuck,
}

/// Computes the size of the next round from the current budget.
///
/// `max_parallel = floor(available * safety_factor / per_call_cost)`, raised to
/// at least one and capped at `hard_cap`. A budget under `min_available` means
/// the bucket is drained and yields [`RoundDecision::Stuck`].
pub fn next_round_size(
    remaining: usize,
    throttle: &ThrottleState,
    per_call_cost: f64,
    config: &EngineConfig,
) -> RoundDecision {
    let available = throttle.currently_available;
    if available < config.min_available {
        return RoundDecision::Stuck;
    }

    let affordable = (available * config.safety_factor / per_call_cost).floor();
    // Saturating float-to-int cast; the clamp keeps it in [1, hard_cap]
    let max_parallel = (affordable as usize).clamp(1, config.hard_cap.max(1));
    let batches = max_parallel.min(remaining);

    RoundDecision::Dispatch {
        batches,
        max_parallel,
        available_after: (available - batches as f64 * per_call_cost).max(0.0),
    }
}

/// Tracks parallelism across rounds so changes can be reported.
#[derive(Debug)]
pub struct ConcurrencyController {
    config: EngineConfig,
    per_call_cost: f64,
    last_parallel: Option<usize>,
}

impl ConcurrencyController {
    pub fn new(config: EngineConfig, per_call_cost: f64) -> Self {
        Self {
            config,
            per_call_cost,
            last_parallel: None,
        }
    }

    /// Recomputes the round size from a fresh budget.
    pub fn decide(&mut self, remaining: usize, throttle: &ThrottleState) -> RoundDecision {
        let decision = next_round_size(remaining, throttle, self.per_call_cost, &self.config);
        if let RoundDecision::Dispatch { max_parallel, .. } = decision {
            match self.last_parallel {
                Some(prev) if prev != max_parallel => {
                    log::info!("Adjusting parallelism from {} to {}", prev, max_parallel);
                }
                None => log::info!("Starting with parallelism {}", max_parallel),
                _ => {}
            }
            self.last_parallel = Some(max_parallel);
        }
        decision
    }

    pub fn per_call_cost(&self) -> f64 {
        self.per_call_cost
    }
}
