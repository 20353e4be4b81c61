//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::engine::RunProgress;
use crate::server::types::AppState;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let engine = state.workloads.engine();
    let progress = engine.progress();
    let throttle = progress.last_throttle();

    let metrics = format!(
        r#"# HELP bulk_mutator_active_runs Adaptive runs currently in progress
# TYPE bulk_mutator_active_runs gauge
bulk_mutator_active_runs {}

# HELP bulk_mutator_parallelism Concurrent calls allowed in the latest round
# TYPE bulk_mutator_parallelism gauge
bulk_mutator_parallelism {}

# HELP bulk_mutator_rounds_total Rounds dispatched
# TYPE bulk_mutator_rounds_total counter
bulk_mutator_rounds_total {}

# HELP bulk_mutator_batches_total Batch calls dispatched, retries included
# TYPE bulk_mutator_batches_total counter
bulk_mutator_batches_total {}

# HELP bulk_mutator_batches_failed_total Batch calls that were not accepted
# TYPE bulk_mutator_batches_failed_total counter
bulk_mutator_batches_failed_total {}

# HELP bulk_mutator_items_updated_total Items accepted by the remote
# TYPE bulk_mutator_items_updated_total counter
bulk_mutator_items_updated_total {}

# HELP bulk_mutator_retries_total Serial retries issued
# TYPE bulk_mutator_retries_total counter
bulk_mutator_retries_total {}

# HELP bulk_mutator_stuck_cycles_total Probe cycles spent waiting for budget
# TYPE bulk_mutator_stuck_cycles_total counter
bulk_mutator_stuck_cycles_total {}

# HELP bulk_mutator_errors_total Failures counted across all runs
# TYPE bulk_mutator_errors_total counter
bulk_mutator_errors_total {}

# HELP bulk_mutator_throttle_available Query cost points available at the last snapshot
# TYPE bulk_mutator_throttle_available gauge
bulk_mutator_throttle_available {}
"#,
        RunProgress::get(&progress.active_runs),
        RunProgress::get(&progress.current_parallelism),
        RunProgress::get(&progress.rounds),
        RunProgress::get(&progress.batches_dispatched),
        RunProgress::get(&progress.batches_failed),
        RunProgress::get(&progress.items_updated),
        RunProgress::get(&progress.retries),
        RunProgress::get(&progress.stuck_cycles),
        engine.stats().total_errors(),
        throttle.map_or(0.0, |t| t.currently_available),
    );

    (StatusCode::OK, metrics).into_response()
}
