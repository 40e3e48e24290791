use axum::response::sse::Event;
use serde::Serialize;
use serde_json::json;

use crate::domain::sample::RaceSample;
use crate::domain::types::{Millis, PilotId, Position};

/// Events pushed to SSE subscribers
///
/// Events are facts about things that have already happened; subscribers
/// receive them in broadcast order with no replay.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RaceEvent {
    /// Emitted to a subscriber immediately after registration
    Connected { id: String },

    /// A processed sample was appended to the store
    #[serde(rename_all = "camelCase")]
    RaceUpdate {
        pilot_id: PilotId,
        position: Position,
        last_lap_ms: Millis,
        points: u32,
        anomaly: bool,
        ts: Millis,
    },

    /// Keepalive marker defeating idle-connection timeouts in proxies
    Ping { ts: Millis },

    /// Best-effort goodbye before a subscriber is removed
    Disconnected { id: String },
}

impl RaceEvent {
    pub fn race_update(sample: &RaceSample) -> Self {
        Self::RaceUpdate {
            pilot_id: sample.pilot_id.clone(),
            position: sample.position,
            last_lap_ms: sample.last_lap_ms,
            points: sample.points,
            anomaly: sample.anomaly,
            ts: sample.ts,
        }
    }

    /// Wire name of the event
    pub fn event_type(&self) -> &'static str {
        match self {
            RaceEvent::Connected { .. } => "connected",
            RaceEvent::RaceUpdate { .. } => "race-update",
            RaceEvent::Ping { .. } => "ping",
            RaceEvent::Disconnected { .. } => "disconnected",
        }
    }

    /// Converts into the axum SSE frame (`event:` + `data:` lines)
    pub fn into_sse_event(self) -> Event {
        let data = serde_json::to_string(&self).unwrap_or_else(|_| json!({}).to_string());
        Event::default().event(self.event_type()).data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Team;
    use crate::domain::Pilot;

    #[test]
    fn test_event_types() {
        let connected = RaceEvent::Connected {
            id: "abc".to_string(),
        };
        assert_eq!(connected.event_type(), "connected");
        assert_eq!(
            RaceEvent::Ping { ts: Millis(1) }.event_type(),
            "ping"
        );
    }

    #[test]
    fn test_race_update_payload_shape() {
        let pilot = Pilot::new(
            PilotId::new("lec16").unwrap(),
            "Charles Leclerc",
            Team::Ferrari,
        )
        .unwrap();
        let sample = RaceSample {
            pilot_id: pilot.id,
            position: Position::new(1).unwrap(),
            last_lap_ms: Millis(81_345),
            points: 25,
            anomaly: false,
            ts: Millis(1_000),
        };

        let event = RaceEvent::race_update(&sample);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["pilotId"], "lec16");
        assert_eq!(value["lastLapMs"], 81_345);
        assert_eq!(value["points"], 25);
        assert_eq!(value["anomaly"], false);
        assert_eq!(value["ts"], 1_000);
    }
}
