//! Operations and batch partitioning.
//!
//! An `Operation` is one independent unit of work against the remote API. The
//! partitioner groups a long, ordered operation list into `Batch`es, each of
//! which becomes exactly one network call. Two remote limits bound a batch:
//! - `max_per_call`: items in one call (e.g. 250 quantities per set call)
//! - `max_aliases`: aliased sub-mutations multiplexed into one call (e.g. 100
//!   per-item updates for kinds without a native bulk form)

mod operation;
mod partition;

pub use operation::{AliasGrouping, Operation, OperationKind, ProductInput};
pub use partition::{partition, Batch, BatchLimits};
