use std::collections::HashMap;

use crate::domain::types::Millis;

use super::service::MetricsError;

/// Throughput counter over a trailing window, bucketed by whole-second
/// epoch. Memory is bounded by the window width, not by total ticks:
/// stale buckets are pruned opportunistically on every tick and read.
#[derive(Debug)]
pub struct TpsCounter {
    window_seconds: u64,
    // key = epoch seconds
    buckets: HashMap<u64, u64>,
}

impl TpsCounter {
    pub fn new(window_seconds: u64) -> Result<Self, MetricsError> {
        if window_seconds == 0 {
            return Err(MetricsError::InvalidWindow);
        }
        Ok(Self {
            window_seconds,
            buckets: HashMap::new(),
        })
    }

    /// Records one completed unit of work
    pub fn tick(&mut self, now: Millis) {
        let sec = now.as_u64() / 1_000;
        *self.buckets.entry(sec).or_insert(0) += 1;
        self.prune(sec);
    }

    /// Ticks per second averaged over the window
    pub fn rate(&mut self, now: Millis) -> f64 {
        self.total_in_window(now) as f64 / self.window_seconds as f64
    }

    /// Total ticks within the trailing window
    pub fn total_in_window(&mut self, now: Millis) -> u64 {
        let sec = now.as_u64() / 1_000;
        self.prune(sec);
        self.buckets.values().sum()
    }

    fn prune(&mut self, current_sec: u64) {
        let oldest = current_sec.saturating_sub(self.window_seconds - 1);
        self.buckets.retain(|sec, _| *sec >= oldest);
    }
}
