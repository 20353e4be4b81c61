//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::constants::*;
use crate::config::types::{Config, EngineConfig, LogFormat, LogLevel};

/// Command-line options and configuration.
///
/// Every option can also be provided through the environment (or a `.env`
/// file), which is how the access token is normally supplied.
///
/// # Examples
///
/// ```bash
/// # Serve the HTTP API for a shop
/// SHOP_ACCESS_TOKEN=shpat_xxx bulk_mutator --shop-domain demo.myshopify.com
///
/// # Tighter safety margin and a lower parallelism cap
/// bulk_mutator --shop-domain demo.myshopify.com --safety-factor 0.7 --hard-cap 50
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "bulk_mutator",
    about = "Serves an HTTP API that drives bulk mutations through a throttled GraphQL API."
)]
pub struct Opt {
    /// Shop domain, e.g. demo.myshopify.com
    #[arg(long, env = "SHOP_DOMAIN")]
    pub shop_domain: String,

    /// Admin API access token
    #[arg(long, env = "SHOP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Admin API version
    #[arg(long, env = "SHOP_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// HTTP API port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Snapshot cache file
    #[arg(long, value_parser, default_value = DEFAULT_SNAPSHOT_FILE)]
    pub snapshot_path: PathBuf,

    /// Snapshot max age in minutes before it is considered stale
    #[arg(long, default_value_t = 60)]
    pub snapshot_max_age_mins: u64,

    /// Product search query used when refreshing the snapshot
    #[arg(long, default_value = DEFAULT_PRODUCT_QUERY)]
    pub product_query: String,

    /// Directory where bulk payload files are staged before upload
    #[arg(long, value_parser, default_value = ".")]
    pub staging_dir: PathBuf,

    /// Fraction of the available throttle budget one round may spend
    #[arg(long, default_value_t = DEFAULT_SAFETY_FACTOR)]
    pub safety_factor: f64,

    /// Maximum concurrent calls per round
    #[arg(long, default_value_t = DEFAULT_HARD_CAP)]
    pub hard_cap: usize,

    /// Attempts per batch, including the first one
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Throttle level below which a round is treated as near-throttled
    #[arg(long, default_value_t = LOW_WATER_MARK)]
    pub low_water_mark: f64,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Config {
            shop_domain: opt.shop_domain,
            access_token: opt.access_token,
            api_version: opt.api_version,
            timeout_seconds: opt.timeout_seconds,
            snapshot_path: opt.snapshot_path,
            snapshot_max_age: Duration::from_secs(opt.snapshot_max_age_mins * 60),
            product_query: opt.product_query,
            staging_dir: opt.staging_dir,
            port: opt.port,
            log_level: opt.log_level,
            log_format: opt.log_format,
            engine: EngineConfig {
                safety_factor: opt.safety_factor.clamp(0.01, 1.0),
                hard_cap: opt.hard_cap.max(1),
                max_attempts: opt.max_attempts.max(1),
                low_water_mark: opt.low_water_mark,
                ..EngineConfig::default()
            },
        }
    }
}
