//! Product snapshot cache.
//!
//! Supplies the item universe the workloads are built from, so the remote
//! does not have to be paginated through on every request. The snapshot is a
//! best-effort JSON file with a max age; nothing depends on its durability.

mod cache;
mod refresh;
mod types;

pub use cache::SnapshotCache;
pub use refresh::{fetch_all_products, load_or_refresh, refresh_snapshot};
pub use types::{Product, Snapshot, Variant};
