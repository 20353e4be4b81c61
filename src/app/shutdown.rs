//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Cancels `shutdown` on Ctrl-C.
///
/// The token stops the HTTP API and every scheduler waiting between rounds;
/// calls already sent to the remote still complete.
pub async fn shutdown_on_ctrl_c(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    log::warn!("Ctrl-C received, shutting down");
                    shutdown.cancel();
                }
                Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
            }
        }
        _ = shutdown.cancelled() => {}
    }
}
