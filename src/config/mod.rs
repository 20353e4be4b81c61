//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (remote limits, throttle defaults, timings)
//! - Library configuration types
//! - CLI option parsing

mod cli;
mod constants;
mod types;

pub use cli::Opt;
pub use constants::*;
pub use types::{Config, EngineConfig, LogFormat, LogLevel};
