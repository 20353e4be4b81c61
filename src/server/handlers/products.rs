//! Product endpoints.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use super::{success, Success};
use crate::config::DEFAULT_PRODUCT_CREATE_COUNT;
use crate::remote::BulkJob;
use crate::server::types::{ApiError, AppState, CreateProductsRequest};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductsResponse {
    result: BulkJob,
    range: ProductRange,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRange {
    start_num: u64,
    end_num: u64,
}

/// `POST /products/create`, optional body `{ "count": n }`
pub async fn create_products(
    State(state): State<AppState>,
    body: Option<Json<CreateProductsRequest>>,
) -> Result<Json<Success<CreateProductsResponse>>, ApiError> {
    let count = body
        .and_then(|Json(b)| b.count)
        .unwrap_or(DEFAULT_PRODUCT_CREATE_COUNT);
    let created = state.workloads.create_products(count).await?;
    Ok(success(CreateProductsResponse {
        message: format!(
            "Bulk operation started for {} {} to {}",
            crate::workloads::PRODUCT_TITLE_PREFIX,
            created.start_num,
            created.end_num
        ),
        result: created.submission.job,
        range: ProductRange {
            start_num: created.start_num,
            end_num: created.end_num,
        },
    }))
}

/// `GET /products/bulk-operation-status`
pub async fn bulk_operation_status(State(state): State<AppState>) -> Result<Response, ApiError> {
    let response = match state.workloads.bulk_operation_status().await? {
        Some(job) => Json(job).into_response(),
        None => Json(json!({ "status": "No current bulk operation" })).into_response(),
    };
    Ok(response)
}
