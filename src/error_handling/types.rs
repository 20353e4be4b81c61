//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the application:
//! typed failures for remote calls, whole-run engine failures and bulk-job
//! setup, plus the `ErrorType` categories counted during a run.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::throttle::ThrottleState;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured GraphQL endpoint is not a valid URL.
    #[error("Invalid GraphQL endpoint: {0}")]
    EndpointError(#[from] url::ParseError),
}

/// Failure of a single remote call.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The remote rejected the call because the bucket is exhausted.
    #[error("Throttled by remote API")]
    Throttled {
        /// Snapshot attached to the rejection, if any
        throttle: Option<ThrottleState>,
    },

    /// Non-success HTTP status other than a throttle rejection.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body (truncated)
        body: String,
        /// Snapshot reported in the error body, if any
        throttle: Option<ThrottleState>,
    },

    /// Network-level failure (timeout, connect, body).
    #[error("Transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// Top-level GraphQL errors with no usable data.
    #[error("GraphQL errors: {}", .messages.join("; "))]
    GraphQl {
        /// Error messages, in response order
        messages: Vec<String>,
        /// Snapshot reported next to the errors, if any
        throttle: Option<ThrottleState>,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether the remote explicitly rejected the call for rate-limit reasons.
    pub fn is_throttle(&self) -> bool {
        matches!(self, RemoteError::Throttled { .. })
    }

    /// Throttle snapshot carried by the error, if any.
    ///
    /// Failed calls still report the remote's bucket when the response had a
    /// cost block; only transport and decode failures never do.
    pub fn throttle(&self) -> Option<ThrottleState> {
        match self {
            RemoteError::Throttled { throttle }
            | RemoteError::Http { throttle, .. }
            | RemoteError::GraphQl { throttle, .. } => *throttle,
            RemoteError::Transport(_) | RemoteError::Decode(_) => None,
        }
    }

    /// Category used for run statistics.
    pub fn error_type(&self) -> ErrorType {
        match self {
            RemoteError::Throttled { .. } => ErrorType::Throttled,
            RemoteError::Http { .. } => ErrorType::HttpStatus,
            RemoteError::Transport(e) => super::categorize_reqwest_error(e),
            RemoteError::GraphQl { .. } => ErrorType::GraphQl,
            RemoteError::Decode(_) => ErrorType::Decode,
        }
    }
}

/// Whole-run failures of the adaptive engine.
///
/// Per-batch failures are never raised through this type; they are collected
/// into the run report instead.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The budget never recovered enough to afford a single call.
    #[error(
        "Stuck waiting for query cost to restore after {cycles} cycles \
         (available: {available}, per-call cost: {per_call_cost}); aborting"
    )]
    Stuck {
        /// Consecutive stuck cycles observed
        cycles: u32,
        /// Last known available budget
        available: f64,
        /// Estimated cost of one call
        per_call_cost: f64,
        /// Items already accepted by the remote before aborting
        completed_items: usize,
    },

    /// The per-call cost estimate cannot drive the controller.
    #[error("Per-call cost must be positive and finite, got {0}")]
    InvalidCost(f64),

    /// Every batch failed on every attempt; nothing reached the remote.
    #[error("All {batches} batches failed; last error: {last_error}")]
    AllBatchesFailed {
        /// Number of batches in the run
        batches: usize,
        /// Error of the last failed attempt
        last_error: String,
    },

    /// The run was abandoned by its caller.
    #[error("Run cancelled after {completed_items} items")]
    Cancelled {
        /// Items already accepted by the remote before cancellation
        completed_items: usize,
    },
}

/// Failures while setting up a remote bulk job.
///
/// Any of these aborts before a remote job exists; the staged payload file is
/// removed regardless.
#[derive(Error, Debug)]
pub enum BulkJobError {
    /// No payload lines were produced.
    #[error("Bulk payload is empty")]
    EmptyPayload,

    /// A bulk job runs a single mutation template over every line.
    #[error("Bulk payload mixes operation kinds")]
    MixedKinds,

    /// The local payload file could not be written or read.
    #[error("Bulk payload file error: {0}")]
    Payload(#[from] std::io::Error),

    /// A payload line could not be serialized.
    #[error("Bulk payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The remote refused to provide an upload target.
    #[error("Staged upload error: {0}")]
    Staging(String),

    /// Transferring the payload to the upload target failed.
    #[error("Upload error: {0}")]
    Upload(String),

    /// The remote refused to start the job.
    #[error("Bulk operation error: {0}")]
    JobStart(String),
}

/// Snapshot cache failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// No snapshot has been saved yet.
    #[error("Inventory cache not found at {0}. Please refresh cache first.")]
    Missing(PathBuf),

    /// Reading or writing the cache file failed.
    #[error("Snapshot cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache file is not valid JSON for a snapshot.
    #[error("Snapshot cache parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Fetching the product universe from the remote failed.
    #[error("Snapshot refresh failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Failure of a workload request, by the layer that failed.
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Bulk(#[from] BulkJobError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl WorkloadError {
    /// Whether the request cannot run until the snapshot is refreshed.
    pub fn is_missing_snapshot(&self) -> bool {
        matches!(self, WorkloadError::Snapshot(SnapshotError::Missing(_)))
    }
}

/// Categories of failures counted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Remote call failures
    Throttled,
    HttpStatus,
    HttpTimeout,
    HttpConnect,
    HttpOther,
    GraphQl,
    Decode,
    // Item-level rejections inside accepted calls
    UserError,
    // Engine-level events
    StuckCycle,
    RetryExhausted,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Throttled => "Throttled by remote API",
            ErrorType::HttpStatus => "HTTP status error",
            ErrorType::HttpTimeout => "HTTP request timeout error",
            ErrorType::HttpConnect => "HTTP request connect error",
            ErrorType::HttpOther => "HTTP request other error",
            ErrorType::GraphQl => "GraphQL error",
            ErrorType::Decode => "Response decode error",
            ErrorType::UserError => "User error (item rejected)",
            ErrorType::StuckCycle => "Stuck waiting for budget",
            ErrorType::RetryExhausted => "Retry attempts exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttled_carries_snapshot() {
        let snapshot = ThrottleState::new(1000.0, 10.0, 50.0);
        let err = RemoteError::Throttled {
            throttle: Some(snapshot),
        };
        assert!(err.is_throttle());
        assert_eq!(err.throttle(), Some(snapshot));
        assert_eq!(err.error_type(), ErrorType::Throttled);
    }

    #[test]
    fn test_http_error_is_not_throttle() {
        let err = RemoteError::Http {
            status: 502,
            body: "bad gateway".to_string(),
            throttle: None,
        };
        assert!(!err.is_throttle());
        assert_eq!(err.throttle(), None);
        assert_eq!(err.error_type(), ErrorType::HttpStatus);
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn test_graphql_error_message_joins_messages() {
        let err = RemoteError::GraphQl {
            messages: vec!["first".into(), "second".into()],
            throttle: None,
        };
        assert_eq!(err.to_string(), "GraphQL errors: first; second");
    }

    #[test]
    fn test_failed_calls_keep_their_snapshot() {
        let snapshot = ThrottleState::new(2000.0, 120.0, 100.0);
        let http = RemoteError::Http {
            status: 503,
            body: "unavailable".to_string(),
            throttle: Some(snapshot),
        };
        let graphql = RemoteError::GraphQl {
            messages: vec!["Invalid id".into()],
            throttle: Some(snapshot),
        };
        assert_eq!(http.throttle(), Some(snapshot));
        assert_eq!(graphql.throttle(), Some(snapshot));
        assert!(!http.is_throttle());
        assert!(!graphql.is_throttle());
    }

    #[test]
    fn test_stuck_error_message() {
        let err = EngineError::Stuck {
            cycles: 121,
            available: 0.0,
            per_call_cost: 50.0,
            completed_items: 0,
        };
        assert!(err.to_string().contains("Stuck waiting for query cost"));
        assert!(err.to_string().contains("121 cycles"));
    }
}
