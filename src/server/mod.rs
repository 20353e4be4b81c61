//! HTTP API over the workloads.
//!
//! Workload endpoints are thin: they pick the workload, run it and shape the
//! JSON. Monitoring endpoints:
//! - `/metrics` - Prometheus-compatible metrics
//! - `/status` - JSON status with engine progress and failure counts
//! - `/health` - liveness

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;

use handlers::{
    bulk_operation_status, create_products, enable_tracking, full_update, health_handler,
    metrics_handler, not_found_handler, refresh_cache, set_available_quantities, status_handler,
    update_prices, update_prices_bulk, update_quantities,
};
pub use types::{
    ApiError, AppState, CreateProductsRequest, PriceRequest, SetQuantitiesRequest, StatusResponse,
};

/// Builds the router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let inventory = Router::new()
        .route("/refresh-cache", post(refresh_cache))
        .route("/enable-tracking", post(enable_tracking))
        .route("/update-quantities", post(update_quantities))
        .route("/set-available-quantities", post(set_available_quantities))
        .route("/update", post(full_update));

    let prices = Router::new()
        .route("/update", post(update_prices))
        .route("/update-bulk", post(update_prices_bulk));

    let products = Router::new()
        .route("/create", post(create_products))
        .route("/bulk-operation-status", get(bulk_operation_status));

    Router::new()
        .nest("/inventory", inventory)
        .nest("/prices", prices)
        .nest("/products", products)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Serves the API on `port` until `shutdown` is cancelled.
pub async fn start_server(
    port: u16,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP API to port {}: {}", port, e))?;

    log::info!("HTTP API listening on http://0.0.0.0:{}/", port);
    log::info!("  - Status: http://127.0.0.1:{}/status", port);
    log::info!("  - Metrics: http://127.0.0.1:{}/metrics", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP API error: {}", e))?;

    log::info!("HTTP API stopped");
    Ok(())
}
