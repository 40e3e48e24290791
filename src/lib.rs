pub mod config;
pub mod domain;
pub mod ingest;
pub mod metrics;
pub mod pilots;
pub mod pipeline;
pub mod shared;
pub mod simulator;
pub mod sse;
pub mod store;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use shared::AppState;

/// Liveness probe
async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "data": { "status": "ok" } }))
}

/// Assembles the full HTTP surface over the shared state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest::handlers::ingest))
        .route("/sse", get(sse::handlers::subscribe))
        .route("/metrics", get(metrics::handlers::get_metrics))
        .route(
            "/api/pilots",
            get(pilots::handlers::list_pilots).post(pilots::handlers::upsert_pilot),
        )
        .route("/api/pilots/latest", get(pilots::handlers::latest_sample))
        .route("/api/pilots/recent", get(pilots::handlers::recent_samples))
        .route("/api/leaderboard", get(pilots::handlers::get_leaderboard))
        .with_state(state)
}
