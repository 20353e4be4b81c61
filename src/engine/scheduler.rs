//! Timer abstraction for the engine's fixed delays.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Returned when a wait was interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Source of the engine's waits: stuck-state re-probes and inter-retry delays.
///
/// Tests substitute an implementation that records delays instead of
/// sleeping, or run the tokio one under paused time.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Waits for `duration`, or returns `Err(Cancelled)` if the run is abandoned.
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;

    /// Whether the run has been abandoned.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Scheduler backed by `tokio::time`, cancellable through a token.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    shutdown: CancellationToken,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler whose waits end early when `shutdown` is cancelled.
    pub fn with_cancellation(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.shutdown.cancelled() => Err(Cancelled),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_paused_clock() {
        let scheduler = TokioScheduler::new();
        let start = tokio::time::Instant::now();
        scheduler.sleep(Duration::from_millis(500)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_cancelled_sleep_returns_early() {
        let token = CancellationToken::new();
        let scheduler = TokioScheduler::with_cancellation(token.clone());
        token.cancel();
        assert_eq!(
            scheduler.sleep(Duration::from_secs(3600)).await,
            Err(Cancelled)
        );
        assert!(scheduler.is_cancelled());
    }
}
