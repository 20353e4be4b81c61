//! HTTP API handlers.

mod inventory;
mod metrics;
mod prices;
mod products;
mod status;

use axum::Json;
use serde::Serialize;

pub use inventory::{
    enable_tracking, full_update, refresh_cache, set_available_quantities, update_quantities,
};
pub use metrics::metrics_handler;
pub use prices::{update_prices, update_prices_bulk};
pub use products::{bulk_operation_status, create_products};
pub use status::{health_handler, not_found_handler, status_handler};

/// `{ "success": true, ...body }`
#[derive(Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub(crate) fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}
