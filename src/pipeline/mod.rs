pub mod anomaly;
pub mod lap_time;
pub mod points;
pub mod sanitize;
pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{now_ms, Millis, PilotId, Position, Team};

use anomaly::AnomalyBounds;
use lap_time::lap_str_to_ms;
use points::PointsTable;
use sanitize::sanitize_string;
use validate::{validate_shape, FieldError, SampleInput, ValidationErrors};

/// Pluggable knobs of the ingestion pipeline: scoring table and
/// plausible lap-time bounds
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub points: PointsTable,
    pub anomaly: AnomalyBounds,
}

/// Fully processed sample: lap time normalized to milliseconds, points
/// derived from position, anomaly flag resolved, timestamp assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleProcessed {
    pub pilot_id: PilotId,
    pub pilot_name: String,
    pub team: Team,
    pub position: Position,
    pub last_lap_ms: Millis,
    pub points: u32,
    pub anomaly: bool,
    pub ts: Millis,
}

/// Pure pipeline orchestrator:
/// validate -> sanitize -> normalize lap time -> compute points -> detect anomaly
///
/// Malformed input never panics or escapes as an error type other than the
/// field-level error list; the caller decides how to surface it.
pub fn process_sample(
    input: &Value,
    config: &PipelineConfig,
) -> Result<SampleProcessed, ValidationErrors> {
    let validated = validate_shape(input)?;
    let sanitized = step_sanitize(validated);

    // Lap-time normalization can still reject shapes the superficial
    // validation let through ("1:2:3" is digits and colons but not a lap
    // time); fold that into the same error list instead of panicking.
    let last_lap_ms = lap_str_to_ms(&sanitized.last_lap_time).map_err(|e| {
        vec![FieldError::new("lastLapTime", e.to_string())]
    })?;

    let pilot_id = PilotId::new(sanitized.pilot_id)
        .map_err(|e| vec![FieldError::new("pilotId", e.to_string())])?;

    let points = config.points.points_for(sanitized.current_position);
    let anomaly = config
        .anomaly
        .detect(last_lap_ms, sanitized.anomaly_detected);

    Ok(SampleProcessed {
        pilot_id,
        pilot_name: sanitized.pilot_name,
        team: sanitized.team,
        position: sanitized.current_position,
        last_lap_ms,
        points,
        anomaly,
        ts: now_ms(),
    })
}

/// Trims and collapses whitespace in string fields without altering
/// numeric or enum fields
fn step_sanitize(value: SampleInput) -> SampleInput {
    SampleInput {
        pilot_id: sanitize_string(&value.pilot_id),
        pilot_name: sanitize_string(&value.pilot_name),
        team: value.team,
        current_position: value.current_position,
        last_lap_time: sanitize_string(&value.last_lap_time),
        current_race_points: value.current_race_points,
        anomaly_detected: value.anomaly_detected,
    }
}
