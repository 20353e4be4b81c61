//! Leaky-bucket throttle tracking.
//!
//! The remote API meters every request against a bucket of query-cost points
//! that drains per call and refills at a fixed restore rate. This module keeps
//! the last snapshot the remote reported:
//! - Every call's response feeds its snapshot back through `observe`
//! - A cheap probe call refreshes the snapshot when nothing recent arrived
//! - The controller reads `projected_budget`, which accounts for the points
//!   restored since the snapshot was taken
//!
//! The remote is authoritative: snapshots overwrite the tracked state without
//! any merging.

mod state;
mod tracker;

pub use state::ThrottleState;
pub use tracker::ThrottleTracker;
