use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use crate::domain::types::now_ms;

use super::latency::{LatencySnapshot, LatencyTracker};
use super::tps::TpsCounter;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metrics window must be > 0 seconds")]
    InvalidWindow,

    #[error("latency tracker capacity must be > 0")]
    InvalidCapacity,
}

/// Point-in-time view served by the metrics endpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub tps: f64,
    pub latency: LatencySnapshot,
}

/// Rolling server metrics: throughput over a trailing window plus
/// latency statistics over the last N requests. Both trackers are
/// mutex-guarded; recording is cheap and never blocks on I/O.
pub struct MetricsService {
    tps: Mutex<TpsCounter>,
    latency: Mutex<LatencyTracker>,
}

impl MetricsService {
    pub fn new(tps_window_seconds: u64, latency_capacity: usize) -> Result<Self, MetricsError> {
        Ok(Self {
            tps: Mutex::new(TpsCounter::new(tps_window_seconds)?),
            latency: Mutex::new(LatencyTracker::new(latency_capacity)?),
        })
    }

    /// Marks one completed request
    pub fn tick(&self) {
        self.tps.lock().unwrap().tick(now_ms());
    }

    /// Records the latency of one request in milliseconds
    pub fn record_latency(&self, ms: f64) {
        self.latency.lock().unwrap().record(ms);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tps: self.tps.lock().unwrap().rate(now_ms()),
            latency: self.latency.lock().unwrap().snapshot(),
        }
    }
}
