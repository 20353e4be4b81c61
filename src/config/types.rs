//! Configuration types.
//!
//! This module defines the library configuration and the engine tuning
//! parameters. Both can be constructed programmatically without any CLI
//! dependencies.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Tuning parameters for the adaptive batch engine.
///
/// The defaults match the remote API's documented leaky bucket and are safe
/// for every operation kind.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fraction of the available budget one round may spend (0.0-1.0)
    pub safety_factor: f64,
    /// Maximum concurrent calls in one round
    pub hard_cap: usize,
    /// Budget below which the controller refuses to dispatch and probes instead
    pub min_available: f64,
    /// Delay between probes while stuck
    pub stuck_delay: Duration,
    /// Consecutive stuck cycles before the run fails
    pub max_stuck_cycles: u32,
    /// Fixed delay before each serial retry
    pub retry_delay: Duration,
    /// Snapshot level under which transport failures become retry-eligible
    pub low_water_mark: f64,
    /// Attempts per batch, including the first one
    pub max_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            hard_cap: DEFAULT_HARD_CAP,
            min_available: DEFAULT_MIN_AVAILABLE,
            stuck_delay: STUCK_RETRY_DELAY,
            max_stuck_cycles: MAX_STUCK_CYCLES,
            retry_delay: RETRY_DELAY,
            low_water_mark: LOW_WATER_MARK,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use bulk_mutator::Config;
///
/// let config = Config {
///     shop_domain: "example.myshopify.com".to_string(),
///     access_token: "token".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Shop domain hosting the GraphQL admin endpoint
    pub shop_domain: String,

    /// Access token sent with every request
    pub access_token: String,

    /// Remote API version segment of the endpoint
    pub api_version: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Snapshot cache file
    pub snapshot_path: PathBuf,

    /// Snapshot max age
    pub snapshot_max_age: Duration,

    /// Product search query used when refreshing the snapshot
    pub product_query: String,

    /// Directory where bulk payload files are staged
    pub staging_dir: PathBuf,

    /// HTTP API port
    pub port: u16,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Adaptive engine tuning
    pub engine: EngineConfig,
}

impl Config {
    /// GraphQL admin endpoint derived from the shop domain and API version.
    pub fn graphql_url(&self) -> String {
        // Plain http is only kept when asked for explicitly (local mocks)
        let (scheme, shop) = match self.shop_domain.strip_prefix("http://") {
            Some(rest) => ("http", rest),
            None => (
                "https",
                self.shop_domain.trim_start_matches("https://"),
            ),
        };
        format!(
            "{}://{}/admin/api/{}/graphql.json",
            scheme,
            shop.trim_end_matches('/'),
            self.api_version
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop_domain: "your-shop.myshopify.com".to_string(),
            access_token: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            snapshot_max_age: DEFAULT_SNAPSHOT_MAX_AGE,
            product_query: DEFAULT_PRODUCT_QUERY.to_string(),
            staging_dir: PathBuf::from("."),
            port: DEFAULT_PORT,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            engine: EngineConfig::default(),
        }
    }
}
