use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::domain::pilot::Pilot;
use crate::domain::sample::RaceSample;
use crate::domain::types::{now_ms, Millis, PilotId, Team};

use super::repository::PilotFallback;
use super::ring_buffer::RingBuffer;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("ring buffer capacity must be > 0")]
    InvalidCapacity,

    #[error("unknown pilot \"{0}\" and no fallback provided")]
    UnknownPilot(String),
}

/// In-memory registry of pilots plus one bounded sample buffer per pilot.
///
/// Structure:
/// - `pilots`: PilotId -> Pilot
/// - `samples`: PilotId -> RingBuffer<RaceSample> (created lazily, size
///   fixed for the store's lifetime, never removed)
/// - `team_index`: Team -> set of PilotIds, kept consistent on upsert
///
/// The store itself is a plain data structure; thread safety is provided
/// by the repository layer that owns it.
#[derive(Debug)]
pub struct RaceDataStore {
    pilots: HashMap<PilotId, Pilot>,
    samples: HashMap<PilotId, RingBuffer<RaceSample>>,
    team_index: HashMap<Team, HashSet<PilotId>>,
    capacity: usize,
}

impl RaceDataStore {
    pub fn new(ring_buffer_capacity: usize) -> Result<Self, StoreError> {
        if ring_buffer_capacity == 0 {
            return Err(StoreError::InvalidCapacity);
        }
        Ok(Self {
            pilots: HashMap::new(),
            samples: HashMap::new(),
            team_index: HashMap::new(),
            capacity: ring_buffer_capacity,
        })
    }

    /// Inserts or replaces a pilot; maintains the team index and ensures a
    /// ring buffer exists for the id
    pub fn upsert_pilot(&mut self, pilot: Pilot) {
        if let Some(existing) = self.pilots.get(&pilot.id) {
            if existing.team != pilot.team {
                if let Some(prev_set) = self.team_index.get_mut(&existing.team) {
                    prev_set.remove(&pilot.id);
                }
            }
        }

        self.team_index
            .entry(pilot.team)
            .or_default()
            .insert(pilot.id.clone());

        if !self.samples.contains_key(&pilot.id) {
            // Capacity was validated at store construction, so this cannot fail
            if let Ok(buf) = RingBuffer::new(self.capacity) {
                self.samples.insert(pilot.id.clone(), buf);
            }
        }

        self.pilots.insert(pilot.id.clone(), pilot);
    }

    pub fn has_pilot(&self, id: &PilotId) -> bool {
        self.pilots.contains_key(id)
    }

    pub fn get_pilot(&self, id: &PilotId) -> Option<&Pilot> {
        self.pilots.get(id)
    }

    pub fn list_pilots(&self) -> Vec<Pilot> {
        self.pilots.values().cloned().collect()
    }

    pub fn list_pilots_by_team(&self, team: Team) -> Vec<Pilot> {
        let Some(set) = self.team_index.get(&team) else {
            return Vec::new();
        };
        set.iter()
            .filter_map(|id| self.pilots.get(id).cloned())
            .collect()
    }

    /// Appends a sample to the pilot's buffer. Unknown pilots are
    /// synthesized from the fallback; without one the append is rejected.
    pub fn append(
        &mut self,
        sample: RaceSample,
        fallback: Option<&PilotFallback>,
    ) -> Result<(), StoreError> {
        if !self.pilots.contains_key(&sample.pilot_id) {
            let Some(fb) = fallback else {
                return Err(StoreError::UnknownPilot(sample.pilot_id.to_string()));
            };
            debug!(pilot_id = %sample.pilot_id, "Creating pilot from fallback on first sample");
            let pilot = Pilot {
                id: sample.pilot_id.clone(),
                name: fb.name.clone(),
                team: fb.team,
            };
            self.upsert_pilot(pilot);
        }

        let buf = match self.samples.get_mut(&sample.pilot_id) {
            Some(buf) => buf,
            None => {
                // upsert_pilot creates the buffer, so this branch only covers
                // pilots registered before the samples map learned about them
                self.samples.insert(
                    sample.pilot_id.clone(),
                    RingBuffer::new(self.capacity).map_err(|_| StoreError::InvalidCapacity)?,
                );
                self.samples
                    .get_mut(&sample.pilot_id)
                    .ok_or(StoreError::InvalidCapacity)?
            }
        };
        buf.push(sample);
        Ok(())
    }

    /// Samples for a pilot with `ts >= now - window_ms`; empty for unknown ids
    pub fn recent_by_pilot(&self, id: &PilotId, window_ms: Millis) -> Vec<RaceSample> {
        let Some(buf) = self.samples.get(id) else {
            return Vec::new();
        };
        let cutoff = now_ms().saturating_sub(window_ms);
        buf.since(cutoff)
    }

    /// Everything currently retained for a pilot, oldest first
    pub fn retained_by_pilot(&self, id: &PilotId) -> Vec<RaceSample> {
        self.samples
            .get(id)
            .map(|buf| buf.to_vec())
            .unwrap_or_default()
    }

    pub fn latest_by_pilot(&self, id: &PilotId) -> Option<RaceSample> {
        self.samples.get(id).and_then(|buf| buf.last())
    }

    /// Latest sample of every known pilot (None for pilots without samples)
    pub fn all_latest(&self) -> Vec<(Pilot, Option<RaceSample>)> {
        self.pilots
            .values()
            .map(|pilot| {
                let latest = self.samples.get(&pilot.id).and_then(|buf| buf.last());
                (pilot.clone(), latest)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Position;

    fn pilot(id: &str, name: &str, team: Team) -> Pilot {
        Pilot::new(PilotId::new(id).unwrap(), name, team).unwrap()
    }

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

    #[test]
    fn test_zero_capacity_fails_construction() {
        assert!(matches!(
            RaceDataStore::new(0),
            Err(StoreError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_upsert_and_list() {
        let mut store = RaceDataStore::new(10).unwrap();
        store.upsert_pilot(pilot("lec16", "Charles Leclerc", Team::Ferrari));
        store.upsert_pilot(pilot("ver33", "Max Verstappen", Team::RedBull));

        assert_eq!(store.list_pilots().len(), 2);
        assert!(store.has_pilot(&PilotId::new("lec16").unwrap()));

        let ferrari = store.list_pilots_by_team(Team::Ferrari);
        assert_eq!(ferrari.len(), 1);
        assert_eq!(ferrari[0].name, "Charles Leclerc");
    }

    #[test]
    fn test_team_reassignment_updates_index() {
        let mut store = RaceDataStore::new(10).unwrap();
        store.upsert_pilot(pilot("ham44", "Lewis Hamilton", Team::Mercedes));
        assert_eq!(store.list_pilots_by_team(Team::Mercedes).len(), 1);

        // Pilot switches team; old index entry must be removed
        store.upsert_pilot(pilot("ham44", "Lewis Hamilton", Team::Ferrari));
        assert!(store.list_pilots_by_team(Team::Mercedes).is_empty());
        assert_eq!(store.list_pilots_by_team(Team::Ferrari).len(), 1);
    }

    #[test]
    fn test_append_unknown_pilot_without_fallback_fails() {
        let mut store = RaceDataStore::new(10).unwrap();
        let result = store.append(sample("ghost", 10, 100), None);
        assert!(matches!(result, Err(StoreError::UnknownPilot(_))));
    }

    #[test]
    fn test_append_unknown_pilot_with_fallback_creates_pilot() {
        let mut store = RaceDataStore::new(10).unwrap();
        let fallback = PilotFallback {
            name: "Charles Leclerc".to_string(),
            team: Team::Ferrari,
        };
        store
            .append(sample("lec16", 25, 100), Some(&fallback))
            .unwrap();

        let id = PilotId::new("lec16").unwrap();
        assert!(store.has_pilot(&id));
        assert_eq!(store.get_pilot(&id).unwrap().team, Team::Ferrari);
        assert_eq!(store.latest_by_pilot(&id).unwrap().points, 25);
    }

    #[test]
    fn test_buffer_capacity_bounds_retention() {
        let mut store = RaceDataStore::new(3).unwrap();
        store.upsert_pilot(pilot("lec16", "Charles Leclerc", Team::Ferrari));
        let id = PilotId::new("lec16").unwrap();

        for i in 0..5u64 {
            store.append(sample("lec16", i as u32, i * 10), None).unwrap();
        }

        let retained = store.retained_by_pilot(&id);
        assert_eq!(retained.len(), 3);
        let points: Vec<u32> = retained.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![2, 3, 4]);
    }

    #[test]
    fn test_recent_by_pilot_filters_by_window() {
        let mut store = RaceDataStore::new(10).unwrap();
        store.upsert_pilot(pilot("lec16", "Charles Leclerc", Team::Ferrari));
        let id = PilotId::new("lec16").unwrap();

        let now = now_ms();
        store
            .append(sample("lec16", 1, now.as_u64().saturating_sub(60_000)), None)
            .unwrap();
        store
            .append(sample("lec16", 2, now.as_u64()), None)
            .unwrap();

        let recent = store.recent_by_pilot(&id, Millis(5_000));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].points, 2);

        // Unknown pilot yields empty, not an error
        let unknown = PilotId::new("ghost").unwrap();
        assert!(store.recent_by_pilot(&unknown, Millis(5_000)).is_empty());
    }

    #[test]
    fn test_all_latest_includes_pilots_without_samples() {
        let mut store = RaceDataStore::new(10).unwrap();
        store.upsert_pilot(pilot("lec16", "Charles Leclerc", Team::Ferrari));
        store.upsert_pilot(pilot("ver33", "Max Verstappen", Team::RedBull));
        store.append(sample("lec16", 25, 100), None).unwrap();

        let all = store.all_latest();
        assert_eq!(all.len(), 2);

        let lec = all
            .iter()
            .find(|(p, _)| p.id.as_str() == "lec16")
            .unwrap();
        assert!(lec.1.is_some());
        let ver = all
            .iter()
            .find(|(p, _)| p.id.as_str() == "ver33")
            .unwrap();
        assert!(ver.1.is_none());
    }
}
