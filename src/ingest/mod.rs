pub mod handlers;

use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::sample::RaceSample;
use crate::pipeline::{process_sample, SampleProcessed};
use crate::shared::{AppError, AppState};
use crate::sse::RaceEvent;
use crate::store::repository::PilotFallback;

/// Runs one raw payload through the full ingestion path: pipeline
/// processing, store append (registering the pilot on first contact),
/// live fan-out and metrics accounting.
///
/// Shared by the HTTP ingest endpoint and the telemetry simulator.
pub async fn ingest_sample(
    state: &AppState,
    payload: &Value,
) -> Result<SampleProcessed, AppError> {
    let started = Instant::now();

    let processed = process_sample(payload, &state.pipeline).map_err(AppError::Validation)?;

    let sample = RaceSample {
        pilot_id: processed.pilot_id.clone(),
        position: processed.position,
        last_lap_ms: processed.last_lap_ms,
        points: processed.points,
        anomaly: processed.anomaly,
        ts: processed.ts,
    };
    let fallback = PilotFallback {
        name: processed.pilot_name.clone(),
        team: processed.team,
    };

    state
        .race_repository
        .append(sample.clone(), Some(fallback))
        .await?;

    state.sse_hub.broadcast(RaceEvent::race_update(&sample)).await;

    state.metrics.tick();
    state
        .metrics
        .record_latency(started.elapsed().as_secs_f64() * 1000.0);

    if processed.anomaly {
        info!(
            pilot_id = %processed.pilot_id,
            last_lap_ms = processed.last_lap_ms.as_u64(),
            "Anomalous lap ingested"
        );
    } else {
        debug!(
            pilot_id = %processed.pilot_id,
            position = %processed.position,
            "Sample ingested"
        );
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PilotId;
    use crate::shared::test_utils::AppStateBuilder;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "pilotId": "lec16",
            "pilotName": "Charles Leclerc",
            "team": "Ferrari",
            "currentPosition": 1,
            "lastLapTime": "1:21.345",
            "anomalyDetected": false
        })
    }

    #[tokio::test]
    async fn test_ingest_appends_and_registers_pilot() {
        let state = AppStateBuilder::new().build();

        let processed = ingest_sample(&state, &payload()).await.unwrap();
        assert_eq!(processed.points, 25);

        let id = PilotId::new("lec16").unwrap();
        let latest = state.race_repository.latest_by_pilot(&id).await.unwrap();
        assert_eq!(latest.unwrap().last_lap_ms.as_u64(), 81_345);

        let pilots = state.race_repository.list_pilots().await.unwrap();
        assert_eq!(pilots.len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_broadcasts_to_subscribers() {
        let state = AppStateBuilder::new().build();
        let (_, mut receiver) = state.sse_hub.subscribe().await;
        receiver.recv().await.unwrap(); // connected

        ingest_sample(&state, &payload()).await.unwrap();

        let event = receiver.recv().await.unwrap();
        assert!(matches!(event, RaceEvent::RaceUpdate { .. }));
    }

    #[tokio::test]
    async fn test_ingest_invalid_payload_is_validation_error() {
        let state = AppStateBuilder::new().build();
        let result = ingest_sample(&state, &json!({ "pilotId": "lec16" })).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_ingest_records_metrics() {
        let state = AppStateBuilder::new().build();
        ingest_sample(&state, &payload()).await.unwrap();

        let snapshot = state.metrics.snapshot();
        assert!(snapshot.tps > 0.0);
        assert_eq!(snapshot.latency.count, 1);
    }
}
