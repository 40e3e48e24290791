use async_trait::async_trait;
use std::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::pilot::Pilot;
use crate::domain::sample::RaceSample;
use crate::domain::types::{Millis, PilotId, Team};
use crate::shared::AppError;

use super::race_store::{RaceDataStore, StoreError};

/// Minimal pilot data used to synthesize an unknown pilot on first sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotFallback {
    pub name: String,
    pub team: Team,
}

/// Trait for race data access
///
/// Mutating operations are mutually exclusive per structure; concurrent
/// appends and upserts cannot corrupt the registries or the team index.
#[async_trait]
pub trait RaceRepository: Send + Sync {
    async fn upsert_pilot(&self, pilot: Pilot) -> Result<(), AppError>;
    async fn get_pilot(&self, id: &PilotId) -> Result<Option<Pilot>, AppError>;
    async fn list_pilots(&self) -> Result<Vec<Pilot>, AppError>;
    async fn list_pilots_by_team(&self, team: Team) -> Result<Vec<Pilot>, AppError>;

    /// Appends a sample; synthesizes the pilot from `fallback` when unknown
    async fn append(
        &self,
        sample: RaceSample,
        fallback: Option<PilotFallback>,
    ) -> Result<(), AppError>;

    async fn recent_by_pilot(
        &self,
        id: &PilotId,
        window_ms: Millis,
    ) -> Result<Vec<RaceSample>, AppError>;
    async fn retained_by_pilot(&self, id: &PilotId) -> Result<Vec<RaceSample>, AppError>;
    async fn latest_by_pilot(&self, id: &PilotId) -> Result<Option<RaceSample>, AppError>;
    async fn all_latest(&self) -> Result<Vec<(Pilot, Option<RaceSample>)>, AppError>;
}

/// In-memory implementation backed by a mutex-guarded [`RaceDataStore`]
pub struct InMemoryRaceRepository {
    store: Mutex<RaceDataStore>,
}

impl InMemoryRaceRepository {
    pub fn new(ring_buffer_capacity: usize) -> Result<Self, StoreError> {
        Ok(Self {
            store: Mutex::new(RaceDataStore::new(ring_buffer_capacity)?),
        })
    }
}

#[async_trait]
impl RaceRepository for InMemoryRaceRepository {
    #[instrument(skip(self, pilot))]
    async fn upsert_pilot(&self, pilot: Pilot) -> Result<(), AppError> {
        debug!(pilot_id = %pilot.id, team = %pilot.team, "Upserting pilot");
        let mut store = self.store.lock().unwrap();
        store.upsert_pilot(pilot);
        Ok(())
    }

    async fn get_pilot(&self, id: &PilotId) -> Result<Option<Pilot>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.get_pilot(id).cloned())
    }

    async fn list_pilots(&self) -> Result<Vec<Pilot>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.list_pilots())
    }

    async fn list_pilots_by_team(&self, team: Team) -> Result<Vec<Pilot>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.list_pilots_by_team(team))
    }

    #[instrument(skip(self, sample, fallback))]
    async fn append(
        &self,
        sample: RaceSample,
        fallback: Option<PilotFallback>,
    ) -> Result<(), AppError> {
        debug!(pilot_id = %sample.pilot_id, ts = sample.ts.as_u64(), "Appending sample");
        let mut store = self.store.lock().unwrap();
        store
            .append(sample, fallback.as_ref())
            .map_err(|e| match e {
                StoreError::UnknownPilot(id) => AppError::UnknownPilot(id),
                StoreError::InvalidCapacity => AppError::Internal,
            })
    }

    async fn recent_by_pilot(
        &self,
        id: &PilotId,
        window_ms: Millis,
    ) -> Result<Vec<RaceSample>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.recent_by_pilot(id, window_ms))
    }

    async fn retained_by_pilot(&self, id: &PilotId) -> Result<Vec<RaceSample>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.retained_by_pilot(id))
    }

    async fn latest_by_pilot(&self, id: &PilotId) -> Result<Option<RaceSample>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.latest_by_pilot(id))
    }

    async fn all_latest(&self) -> Result<Vec<(Pilot, Option<RaceSample>)>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.all_latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Position;

    fn sample(id: &str, points: u32, ts: u64) -> RaceSample {
        RaceSample {
            pilot_id: PilotId::new(id).unwrap(),
            position: Position::new(1).unwrap(),
            last_lap_ms: Millis(81_345),
            points,
            anomaly: false,
            ts: Millis(ts),
        }
    }

    #[tokio::test]
    async fn test_append_with_fallback_then_query() {
        let repo = InMemoryRaceRepository::new(10).unwrap();
        let fallback = PilotFallback {
            name: "Charles Leclerc".to_string(),
            team: Team::Ferrari,
        };

        repo.append(sample("lec16", 25, 100), Some(fallback))
            .await
            .unwrap();

        let id = PilotId::new("lec16").unwrap();
        let latest = repo.latest_by_pilot(&id).await.unwrap();
        assert_eq!(latest.unwrap().points, 25);

        let pilots = repo.list_pilots().await.unwrap();
        assert_eq!(pilots.len(), 1);
        assert_eq!(pilots[0].name, "Charles Leclerc");
    }

    #[tokio::test]
    async fn test_append_unknown_without_fallback_is_client_error() {
        let repo = InMemoryRaceRepository::new(10).unwrap();
        let result = repo.append(sample("ghost", 1, 100), None).await;
        assert!(matches!(result, Err(AppError::UnknownPilot(_))));
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_lose_samples() {
        use std::sync::Arc;

        let repo = Arc::new(InMemoryRaceRepository::new(100).unwrap());
        let mut handles = Vec::new();

        for i in 0..10u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let fallback = PilotFallback {
                    name: "Charles Leclerc".to_string(),
                    team: Team::Ferrari,
                };
                repo.append(sample("lec16", i as u32, i * 10), Some(fallback))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let id = PilotId::new("lec16").unwrap();
        let retained = repo.retained_by_pilot(&id).await.unwrap();
        assert_eq!(retained.len(), 10);
    }
}
