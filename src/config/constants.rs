//! Configuration constants.
//!
//! This module defines the remote-API limits, throttle defaults and engine
//! timing parameters used throughout the application.

use std::time::Duration;

// Remote protocol limits
/// Maximum number of items in a single mutation's item array
pub const MAX_ITEMS_PER_CALL: usize = 250;
/// Maximum number of aliased sub-mutations multiplexed into one request
pub const MAX_ALIASES_PER_CALL: usize = 100;

// Throttle defaults
/// Bucket capacity assumed before the first snapshot arrives
pub const DEFAULT_MAXIMUM_AVAILABLE: f64 = 20_000.0;
/// Available budget assumed before the first snapshot arrives (near-full bucket)
pub const DEFAULT_CURRENTLY_AVAILABLE: f64 = 20_000.0;
/// Restore rate in points per second assumed before the first snapshot arrives
pub const DEFAULT_RESTORE_RATE: f64 = 1_000.0;

// Adaptive concurrency
/// Fraction of the available budget a single round may spend
pub const DEFAULT_SAFETY_FACTOR: f64 = 0.9;
/// Upper bound on concurrent calls per round regardless of budget
pub const DEFAULT_HARD_CAP: usize = 500;
/// Budget below which not even one call is dispatched
pub const DEFAULT_MIN_AVAILABLE: f64 = 1.0;
/// Delay between throttle probes while stuck
pub const STUCK_RETRY_DELAY: Duration = Duration::from_millis(500);
/// Consecutive stuck cycles tolerated before the run is aborted (~60s)
pub const MAX_STUCK_CYCLES: u32 = 120;

// Retry governor
/// Fixed delay before each serial retry
pub const RETRY_DELAY: Duration = Duration::from_secs(1);
/// A snapshot below this many points signals imminent throttling
pub const LOW_WATER_MARK: f64 = 2_000.0;
/// Maximum number of attempts per batch (initial attempt + retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

// Estimated query cost per aliased sub-mutation
/// Cost of one native set-quantity call (its whole item array is one alias)
pub const SET_QUANTITY_ALIAS_COST: f64 = 10.0;
/// Cost of one native set-on-hand call, same shape as set-quantity
pub const SET_ON_HAND_ALIAS_COST: f64 = 10.0;
/// Cost of one aliased tracking update
pub const ENABLE_TRACKING_ALIAS_COST: f64 = 10.0;
/// Cost of one per-product variant price update
pub const PRICE_UPDATE_ALIAS_COST: f64 = 50.0;
/// Cost of one product creation
pub const PRODUCT_CREATE_ALIAS_COST: f64 = 10.0;

// Snapshot refresh
/// Products fetched per page while refreshing the snapshot
pub const SNAPSHOT_PAGE_SIZE: usize = 100;
/// Variants fetched per product while refreshing the snapshot
pub const SNAPSHOT_VARIANTS_PER_PRODUCT: usize = 100;
/// Default product search query for the snapshot
pub const DEFAULT_PRODUCT_QUERY: &str = "title:Dummy Product*";
/// Default snapshot cache file
pub const DEFAULT_SNAPSHOT_FILE: &str = "inventory_cache.json";
/// Snapshot max age before it is considered stale (1 hour)
pub const DEFAULT_SNAPSHOT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

// Workloads
/// Upper bound (inclusive) of generated random quantities
pub const MAX_RANDOM_QUANTITY: i64 = 2000;
/// Price applied by the price workloads when none is given
pub const DEFAULT_VARIANT_PRICE: &str = "100.00";
/// Products created per product-creation request when none is given
pub const DEFAULT_PRODUCT_CREATE_COUNT: usize = 30_000;

// Bulk jobs
/// MIME type of staged bulk payloads
pub const BULK_PAYLOAD_MIME_TYPE: &str = "text/jsonl";
/// Staged upload resource for bulk mutation variables
pub const BULK_UPLOAD_RESOURCE: &str = "BULK_MUTATION_VARIABLES";
/// Name of the staged upload parameter that carries the path key
pub const STAGED_UPLOAD_KEY_PARAM: &str = "key";

// Remote API
/// Default remote API version
pub const DEFAULT_API_VERSION: &str = "2025-07";
/// Header carrying the access token
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Retry strategy for read-only snapshot pages
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retry attempts for snapshot pages
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// HTTP server
/// Default port for the HTTP API
pub const DEFAULT_PORT: u16 = 4000;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Maximum error message length kept in batch results
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
