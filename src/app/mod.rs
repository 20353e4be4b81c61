//! Main application modules.
//!
//! This module provides shutdown handling and the statistics printing used by
//! the workloads and the binary.

pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use shutdown::shutdown_on_ctrl_c;
pub use statistics::{print_error_statistics, print_progress_summary, print_run_summary};
