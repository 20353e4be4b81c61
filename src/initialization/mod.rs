//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - HTTP client (timeouts, User-Agent)

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;
