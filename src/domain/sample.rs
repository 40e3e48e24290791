use serde::{Deserialize, Serialize};

use super::types::{Millis, PilotId, Position};
use crate::store::ring_buffer::TimeStamped;

/// Immutable snapshot of one telemetry observation, already normalized by
/// the ingestion pipeline: lap time in milliseconds, points derived from
/// position, anomaly flag resolved.
///
/// Every field is validated before construction via the domain newtypes;
/// there is no way to hold an out-of-range position or negative duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSample {
    pub pilot_id: PilotId,
    pub position: Position,
    pub last_lap_ms: Millis,
    pub points: u32,
    pub anomaly: bool,
    pub ts: Millis,
}

impl TimeStamped for RaceSample {
    fn ts(&self) -> Millis {
        self.ts
    }
}
