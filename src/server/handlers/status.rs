//! JSON status, health and fallback handlers.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::engine::RunProgress;
use crate::error_handling::ErrorType;
use crate::server::types::{
    AppState, BatchCounts, ErrorCounts, ItemCounts, SnapshotStatus, StatusResponse,
};

/// JSON status endpoint with engine progress and failure counts
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let engine = state.workloads.engine();
    let progress = engine.progress();
    let stats = engine.stats();
    let cache = state.workloads.cache();

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        active_runs: RunProgress::get(&progress.active_runs),
        completed_runs: RunProgress::get(&progress.completed_runs),
        current_parallelism: RunProgress::get(&progress.current_parallelism),
        rounds: RunProgress::get(&progress.rounds),
        batches: BatchCounts {
            dispatched: RunProgress::get(&progress.batches_dispatched),
            failed: RunProgress::get(&progress.batches_failed),
        },
        items: ItemCounts {
            attempted: RunProgress::get(&progress.items_attempted),
            updated: RunProgress::get(&progress.items_updated),
        },
        retries: RunProgress::get(&progress.retries),
        stuck_cycles: RunProgress::get(&progress.stuck_cycles),
        throttle: progress.last_throttle(),
        snapshot: SnapshotStatus {
            exists: cache.exists(),
            valid: cache.is_valid(),
            age_minutes: cache.age_minutes(),
        },
        errors: ErrorCounts {
            total: stats.total_errors(),
            throttled: stats.get_error_count(ErrorType::Throttled),
            transport: stats.get_error_count(ErrorType::HttpTimeout)
                + stats.get_error_count(ErrorType::HttpConnect)
                + stats.get_error_count(ErrorType::HttpOther),
            http_status: stats.get_error_count(ErrorType::HttpStatus),
            graphql: stats.get_error_count(ErrorType::GraphQl),
            decode: stats.get_error_count(ErrorType::Decode),
            user_errors: stats.get_error_count(ErrorType::UserError),
            retry_exhausted: stats.get_error_count(ErrorType::RetryExhausted),
        },
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime": state.start_time.elapsed().as_secs_f64(),
    }))
    .into_response()
}

pub async fn not_found_handler(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
        .into_response()
}
