use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::types::Millis;
use crate::metrics::MetricsService;
use crate::pipeline::validate::ValidationErrors;
use crate::pipeline::PipelineConfig;
use crate::sse::SseHub;
use crate::store::repository::RaceRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub race_repository: Arc<dyn RaceRepository + Send + Sync>,
    pub sse_hub: Arc<SseHub>,
    pub metrics: Arc<MetricsService>,
    pub pipeline: PipelineConfig,
    /// Default query window for recent-sample reads
    pub history_window_ms: Millis,
}

impl AppState {
    pub fn new(
        race_repository: Arc<dyn RaceRepository + Send + Sync>,
        sse_hub: Arc<SseHub>,
        metrics: Arc<MetricsService>,
        pipeline: PipelineConfig,
        history_window_ms: Millis,
    ) -> Self {
        Self {
            race_repository,
            sse_hub,
            metrics,
            pipeline,
            history_window_ms,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("Unknown pilot: {0}")]
    UnknownPilot(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Invalid payload".to_string(),
                Some(serde_json::to_value(errors.as_slice()).unwrap_or_default()),
            ),
            AppError::UnknownPilot(id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_PILOT",
                format!("Unknown pilot: {}", id),
                None,
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal server error".to_string(),
                None,
            ),
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = Json(json!({ "ok": false, "error": error }));
        (status, body).into_response()
    }
}
