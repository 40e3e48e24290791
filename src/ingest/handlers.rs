use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::instrument;

use crate::shared::{AppError, AppState};

use super::ingest_sample;

/// POST /ingest
///
/// Accepts one raw telemetry payload. The body is taken as a raw JSON
/// value so malformed fields produce the structured field-error list
/// rather than a deserialization rejection.
#[instrument(skip(state, payload))]
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let processed = ingest_sample(&state, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "data": processed })),
    ))
}
