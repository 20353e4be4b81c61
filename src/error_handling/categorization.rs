//! Error categorization and retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, RemoteError};

/// Creates an exponential backoff retry strategy for read-only calls.
///
/// Mutations never go through this strategy: their retries are decided by the
/// engine's retry governor. Snapshot page fetches use it so a single transient
/// failure does not discard a long pagination.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(status) = error.status() {
        if status.as_u16() == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS {
            return ErrorType::Throttled;
        }
        return ErrorType::HttpStatus;
    }

    if error.is_timeout() {
        ErrorType::HttpTimeout
    } else if error.is_connect() {
        ErrorType::HttpConnect
    } else if error.is_decode() {
        ErrorType::Decode
    } else {
        ErrorType::HttpOther
    }
}

/// Determines whether a failed read-only call is worth retrying.
///
/// Throttle rejections, 5xx statuses and network failures are transient.
/// GraphQL errors, decode errors and 4xx statuses will fail the same way again.
pub fn is_retriable_read(error: &RemoteError) -> bool {
    match error {
        RemoteError::Throttled { .. } => true,
        RemoteError::Http { status, .. } => (500..600).contains(status),
        RemoteError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        RemoteError::GraphQl { .. } | RemoteError::Decode(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_retry_strategy_max_attempts() {
        let strategy = get_retry_strategy();
        assert_eq!(strategy.count(), crate::config::RETRY_MAX_ATTEMPTS);
    }

    #[test]
    fn test_get_retry_strategy_max_delay() {
        let max_delay_ms = crate::config::RETRY_MAX_DELAY_SECS * 1000;
        for delay in get_retry_strategy() {
            assert!(
                delay.as_millis() <= max_delay_ms as u128,
                "Delay {}ms exceeds max {}ms",
                delay.as_millis(),
                max_delay_ms
            );
        }
    }

    #[test]
    fn test_is_retriable_read() {
        assert!(is_retriable_read(&RemoteError::Throttled { throttle: None }));
        assert!(is_retriable_read(&RemoteError::Http {
            status: 503,
            body: String::new(),
            throttle: None,
        }));
        assert!(!is_retriable_read(&RemoteError::Http {
            status: 401,
            body: String::new(),
            throttle: None,
        }));
        assert!(!is_retriable_read(&RemoteError::GraphQl {
            messages: vec!["Field 'x' doesn't exist".into()],
            throttle: None,
        }));
        assert!(!is_retriable_read(&RemoteError::Decode("missing data".into())));
    }
}
