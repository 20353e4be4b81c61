//! Inventory endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{success, Success};
use crate::engine::RunReport;
use crate::server::types::{ApiError, AppState, SetQuantitiesRequest};
use crate::workloads::FullInventoryReport;

#[derive(Serialize)]
pub struct RefreshResponse {
    count: usize,
    message: String,
}

#[derive(Serialize)]
pub struct FullUpdateResponse {
    #[serde(flatten)]
    report: FullInventoryReport,
    message: &'static str,
}

/// `POST /inventory/refresh-cache`
pub async fn refresh_cache(
    State(state): State<AppState>,
) -> Result<Json<Success<RefreshResponse>>, ApiError> {
    let count = state.workloads.refresh_cache().await?;
    Ok(success(RefreshResponse {
        count,
        message: format!("Cache refreshed with {} products", count),
    }))
}

/// `POST /inventory/enable-tracking`
pub async fn enable_tracking(
    State(state): State<AppState>,
) -> Result<Json<Success<RunReport>>, ApiError> {
    Ok(success(state.workloads.enable_tracking().await?))
}

/// `POST /inventory/update-quantities`, optional body `{ "quantity": n }`
pub async fn update_quantities(
    State(state): State<AppState>,
    body: Option<Json<SetQuantitiesRequest>>,
) -> Result<Json<Success<RunReport>>, ApiError> {
    let quantity = body.and_then(|Json(b)| b.quantity);
    Ok(success(
        state.workloads.update_on_hand_quantities(quantity).await?,
    ))
}

/// `POST /inventory/set-available-quantities`, optional body `{ "quantity": n }`
pub async fn set_available_quantities(
    State(state): State<AppState>,
    body: Option<Json<SetQuantitiesRequest>>,
) -> Result<Json<Success<RunReport>>, ApiError> {
    let quantity = body.and_then(|Json(b)| b.quantity);
    Ok(success(
        state.workloads.set_available_quantities(quantity).await?,
    ))
}

/// `POST /inventory/update`
pub async fn full_update(
    State(state): State<AppState>,
) -> Result<Json<Success<FullUpdateResponse>>, ApiError> {
    let report = state.workloads.full_inventory_update().await?;
    Ok(success(FullUpdateResponse {
        report,
        message: "Full inventory update completed",
    }))
}
