//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions (remote calls, engine runs, bulk jobs, snapshot cache)
//! - Failure statistics tracking
//! - Error categorization and the read-only retry strategy
//!
//! Per-batch and per-item failures are collected into run reports rather than
//! raised; only whole-run conditions surface as `EngineError` or `BulkJobError`.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy, is_retriable_read};
pub use stats::ProcessingStats;
pub use types::{
    BulkJobError, EngineError, ErrorType, InitializationError, RemoteError, SnapshotError,
    WorkloadError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::Throttled);
        stats.increment_error(ErrorType::Throttled);
        stats.add_errors(ErrorType::UserError, 3);
        assert_eq!(stats.get_error_count(ErrorType::Throttled), 2);
        assert_eq!(stats.get_error_count(ErrorType::UserError), 3);
        assert_eq!(stats.total_errors(), 5);
    }
}
