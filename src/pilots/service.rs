use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::pilot::Pilot;
use crate::domain::sample::RaceSample;
use crate::domain::types::{Millis, PilotId, Team};
use crate::shared::AppError;
use crate::store::repository::RaceRepository;

use super::leaderboard::{rank, LeaderboardRow};
use super::types::PilotUpsertRequest;

/// Read/write facade over the race repository for the HTTP surface.
/// Owns no state of its own; all persistence goes through the trait.
#[derive(Clone)]
pub struct PilotService {
    repository: Arc<dyn RaceRepository + Send + Sync>,
}

impl PilotService {
    pub fn new(repository: Arc<dyn RaceRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request))]
    pub async fn upsert(&self, request: PilotUpsertRequest) -> Result<Pilot, AppError> {
        let id = PilotId::new(request.id).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let team = Team::from_str(&request.team)
            .map_err(|_| AppError::BadRequest(format!("Unknown team: {}", request.team)))?;
        let pilot = Pilot::new(id, request.name, team)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        debug!(pilot_id = %pilot.id, team = %pilot.team, "Registering pilot");
        self.repository.upsert_pilot(pilot.clone()).await?;
        Ok(pilot)
    }

    pub async fn list(&self) -> Result<Vec<Pilot>, AppError> {
        self.repository.list_pilots().await
    }

    pub async fn list_by_team(&self, team: Team) -> Result<Vec<Pilot>, AppError> {
        self.repository.list_pilots_by_team(team).await
    }

    /// Most recent sample for one pilot. Unknown pilots are a 404, a
    /// known pilot without telemetry yet yields `None`.
    pub async fn latest(&self, id: &PilotId) -> Result<Option<RaceSample>, AppError> {
        self.require_pilot(id).await?;
        self.repository.latest_by_pilot(id).await
    }

    /// Samples for one pilot newer than `now - window_ms`, oldest first
    pub async fn recent(
        &self,
        id: &PilotId,
        window_ms: Millis,
    ) -> Result<Vec<RaceSample>, AppError> {
        self.require_pilot(id).await?;
        self.repository.recent_by_pilot(id, window_ms).await
    }

    /// Builds the leaderboard. Points are summed over the pilot's
    /// retained samples, optionally restricted to a trailing window;
    /// display fields come from the overall latest sample.
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        window_ms: Option<Millis>,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        let mut rows = Vec::new();

        for (pilot, latest) in self.repository.all_latest().await? {
            let samples = match window_ms {
                Some(window) => self.repository.recent_by_pilot(&pilot.id, window).await?,
                None => self.repository.retained_by_pilot(&pilot.id).await?,
            };
            let points = samples.iter().map(|s| s.points).sum();

            rows.push(LeaderboardRow {
                pilot_id: pilot.id,
                pilot_name: pilot.name,
                team: pilot.team,
                points,
                position: latest.as_ref().map(|s| s.position),
                last_lap_ms: latest.as_ref().map(|s| s.last_lap_ms),
                anomaly: latest.as_ref().map(|s| s.anomaly),
                ts: latest.as_ref().map(|s| s.ts),
            });
        }

        Ok(rank(rows))
    }

    async fn require_pilot(&self, id: &PilotId) -> Result<(), AppError> {
        match self.repository.get_pilot(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Unknown pilot: {}", id))),
        }
    }
}
