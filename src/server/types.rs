//! HTTP API data structures.

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error_handling::WorkloadError;
use crate::throttle::ThrottleState;
use crate::workloads::Workloads;

/// Shared state for the HTTP API
#[derive(Clone)]
pub struct AppState {
    pub workloads: Workloads,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(workloads: Workloads) -> Self {
        Self {
            workloads,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// Body of the quantity endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SetQuantitiesRequest {
    /// Fixed quantity for every item; random per item when absent
    pub quantity: Option<i64>,
}

/// Body of the price endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PriceRequest {
    pub price: Option<String>,
}

/// Body of `POST /products/create`
#[derive(Debug, Default, Deserialize)]
pub struct CreateProductsRequest {
    pub count: Option<usize>,
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub active_runs: usize,
    pub completed_runs: usize,
    pub current_parallelism: usize,
    pub rounds: usize,
    pub batches: BatchCounts,
    pub items: ItemCounts,
    pub retries: usize,
    pub stuck_cycles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<ThrottleState>,
    pub snapshot: SnapshotStatus,
    pub errors: ErrorCounts,
}

#[derive(Serialize)]
pub struct BatchCounts {
    pub dispatched: usize,
    pub failed: usize,
}

#[derive(Serialize)]
pub struct ItemCounts {
    pub attempted: usize,
    pub updated: usize,
}

#[derive(Serialize)]
pub struct SnapshotStatus {
    pub exists: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<u64>,
}

#[derive(Serialize)]
pub struct ErrorCounts {
    pub total: usize,
    pub throttled: usize,
    pub transport: usize,
    pub http_status: usize,
    pub graphql: usize,
    pub decode: usize,
    pub user_errors: usize,
    pub retry_exhausted: usize,
}

/// A failed workload request rendered as `{ "success": false, "error": ... }`.
///
/// A missing snapshot is the caller's to fix (400); everything else is 500.
pub struct ApiError(pub WorkloadError);

impl From<WorkloadError> for ApiError {
    fn from(e: WorkloadError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_missing_snapshot() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Inventory cache not found. Please refresh cache first.",
                })),
            )
                .into_response();
        }

        log::error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::config::Config;
    use crate::engine::Engine;
    use crate::error_handling::{EngineError, SnapshotError};
    use crate::remote::GraphQlClient;
    use crate::snapshot::SnapshotCache;

    /// State pointing at an address nothing listens on.
    pub(crate) fn state_without_remote() -> AppState {
        let config = Config {
            shop_domain: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = GraphQlClient::from_config(&config).unwrap();
        let engine = Engine::new(Arc::new(client), config.engine.clone());
        let cache = SnapshotCache::new(
            std::env::temp_dir().join("bulk_mutator_missing_snapshot.json"),
            config.snapshot_max_age,
        );
        AppState::new(Workloads::new(engine, cache, "", PathBuf::from(".")))
    }

    #[test]
    fn test_missing_snapshot_is_bad_request() {
        let err = ApiError(WorkloadError::Snapshot(SnapshotError::Missing(
            PathBuf::from("inventory_cache.json"),
        )));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_engine_failure_is_server_error() {
        let err = ApiError(WorkloadError::Engine(EngineError::InvalidCost(0.0)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
