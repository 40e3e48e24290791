use crate::domain::types::Millis;

/// Plausible lap-duration bounds for the single-sample anomaly heuristic.
///
/// This is stateless: it sees one sample at a time and cannot detect
/// trend-based anomalies. Bounds depend on the circuit; the defaults
/// cover a typical lap between 40 s and 3 min.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyBounds {
    pub min_lap_ms: Millis,
    pub max_lap_ms: Millis,
}

impl Default for AnomalyBounds {
    fn default() -> Self {
        Self {
            min_lap_ms: Millis(40_000),
            max_lap_ms: Millis(180_000),
        }
    }
}

impl AnomalyBounds {
    /// Anomalous when the source pre-flagged the sample, or the lap
    /// duration falls outside the plausible range
    pub fn detect(&self, last_lap_ms: Millis, source_flag: Option<bool>) -> bool {
        if source_flag == Some(true) {
            return true;
        }
        last_lap_ms < self.min_lap_ms || last_lap_ms > self.max_lap_ms
    }
}
