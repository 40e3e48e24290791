use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::instrument;

use crate::shared::AppState;

/// HTTP handler for the metrics endpoint
///
/// GET /metrics
/// Returns a point-in-time snapshot of throughput and latency.
#[instrument(name = "get_metrics", skip(state))]
pub async fn get_metrics(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.metrics.snapshot();
    Json(json!({ "ok": true, "data": snapshot }))
}
