use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::str::FromStr;
use tracing::instrument;

use crate::domain::types::{Millis, PilotId, Team};
use crate::shared::{AppError, AppState};

use super::service::PilotService;
use super::types::{LatestQuery, LeaderboardQuery, PilotListQuery, PilotUpsertRequest, RecentQuery};

/// POST /api/pilots
///
/// Registers a pilot or updates its name/team.
#[instrument(skip(state, request))]
pub async fn upsert_pilot(
    State(state): State<AppState>,
    Json(request): Json<PilotUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pilot = PilotService::new(state.race_repository).upsert(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "data": pilot }))))
}

/// GET /api/pilots?team=Ferrari
#[instrument(skip(state))]
pub async fn list_pilots(
    State(state): State<AppState>,
    Query(query): Query<PilotListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = PilotService::new(state.race_repository);

    let pilots = match query.team {
        Some(raw) => {
            let team = Team::from_str(&raw)
                .map_err(|_| AppError::BadRequest(format!("Unknown team: {}", raw)))?;
            service.list_by_team(team).await?
        }
        None => service.list().await?,
    };

    Ok(Json(json!({ "ok": true, "data": pilots })))
}

/// GET /api/pilots/latest?id=lec16
///
/// `data` is null for a registered pilot that has not produced a sample.
#[instrument(skip(state))]
pub async fn latest_sample(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = PilotId::new(query.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let latest = PilotService::new(state.race_repository).latest(&id).await?;
    Ok(Json(json!({ "ok": true, "data": latest })))
}

/// GET /api/pilots/recent?id=lec16&windowMs=60000
///
/// Falls back to the configured history window when `windowMs` is
/// omitted.
#[instrument(skip(state))]
pub async fn recent_samples(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = PilotId::new(query.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let window = query.window_ms.map(Millis).unwrap_or(state.history_window_ms);

    let samples = PilotService::new(state.race_repository)
        .recent(&id, window)
        .await?;
    Ok(Json(json!({ "ok": true, "data": samples })))
}

/// GET /api/leaderboard?windowMs=60000
#[instrument(skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = PilotService::new(state.race_repository)
        .leaderboard(query.window_ms.map(Millis))
        .await?;
    Ok(Json(json!({ "ok": true, "data": rows })))
}
