//! bulk_mutator library: adaptive, rate-aware bulk mutations
//!
//! This library drives large lists of independent mutations through a GraphQL
//! API that meters clients with a cost-based leaky bucket. Operations are
//! partitioned into protocol-sized batches and dispatched in concurrent
//! rounds whose width follows the remote's throttle feedback; throttled
//! batches are retried serially, and whole workloads can instead be handed to
//! the remote's asynchronous bulk engine.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bulk_mutator::batch::{Operation, OperationKind};
//! use bulk_mutator::engine::Engine;
//! use bulk_mutator::remote::GraphQlClient;
//! use bulk_mutator::{Config, EngineConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     shop_domain: "demo.myshopify.com".to_string(),
//!     access_token: "shpat_xxx".to_string(),
//!     ..Default::default()
//! };
//! let remote = GraphQlClient::from_config(&config)?;
//! let engine = Engine::new(Arc::new(remote), EngineConfig::default());
//!
//! let operations = vec![Operation::EnableTracking {
//!     inventory_item_id: "gid://shopify/InventoryItem/1".to_string(),
//! }];
//! let kind = OperationKind::EnableTracking;
//! let limits = kind.default_limits();
//! let report = engine
//!     .run_adaptive_batch(operations, limits, kind.per_call_cost(limits))
//!     .await?;
//! println!("{} of {} items updated", report.updated_count, report.attempted_items);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod batch;
pub mod bulk;
pub mod config;
pub mod engine;
pub mod error_handling;
pub mod initialization;
pub mod remote;
pub mod server;
pub mod snapshot;
pub mod throttle;
pub mod workloads;

// Re-export public API
pub use config::{Config, EngineConfig, LogFormat, LogLevel, Opt};
pub use engine::{Engine, RunReport};
pub use error_handling::{BulkJobError, EngineError, RemoteError, SnapshotError, WorkloadError};
pub use remote::{GraphQlClient, RemoteApi};
pub use server::{build_router, start_server, AppState};
pub use workloads::Workloads;
