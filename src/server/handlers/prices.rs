//! Price endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{success, Success};
use crate::config::DEFAULT_VARIANT_PRICE;
use crate::engine::RunReport;
use crate::remote::BulkJobStatus;
use crate::server::types::{ApiError, AppState, PriceRequest};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPriceResponse {
    bulk_operation_id: String,
    status: BulkJobStatus,
    variant_count: usize,
    operation_count: usize,
    message: &'static str,
}

fn requested_price(body: Option<Json<PriceRequest>>) -> String {
    body.and_then(|Json(b)| b.price)
        .unwrap_or_else(|| DEFAULT_VARIANT_PRICE.to_string())
}

/// `POST /prices/update`: live adaptive rounds
pub async fn update_prices(
    State(state): State<AppState>,
    body: Option<Json<PriceRequest>>,
) -> Result<Json<Success<RunReport>>, ApiError> {
    let price = requested_price(body);
    Ok(success(state.workloads.update_prices(&price).await?))
}

/// `POST /prices/update-bulk`: one remote bulk job
pub async fn update_prices_bulk(
    State(state): State<AppState>,
    body: Option<Json<PriceRequest>>,
) -> Result<Json<Success<BulkPriceResponse>>, ApiError> {
    let price = requested_price(body);
    let submission = state.workloads.update_prices_bulk(&price).await?;
    Ok(success(BulkPriceResponse {
        bulk_operation_id: submission.job.id,
        status: submission.job.status,
        variant_count: submission.item_count,
        operation_count: submission.operation_count,
        message: "Bulk price update started. Use /products/bulk-operation-status to check progress.",
    }))
}
