use serde::{Deserialize, Serialize};

use super::service::MetricsError;

/// Point-in-time latency statistics over the retained samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySnapshot {
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub count: usize,
}

/// Fixed-capacity circular buffer of request latencies (milliseconds).
///
/// Recording is O(1) with the running sum maintained incrementally
/// (the value about to be overwritten is subtracted first). Snapshots
/// copy and sort the occupied portion, O(n log n) for n <= capacity.
#[derive(Debug)]
pub struct LatencyTracker {
    buffer: Vec<f64>,
    capacity: usize,
    index: usize,
    filled: usize,
    sum: f64,
}

impl LatencyTracker {
    pub fn new(capacity: usize) -> Result<Self, MetricsError> {
        if capacity == 0 {
            return Err(MetricsError::InvalidCapacity);
        }
        Ok(Self {
            buffer: vec![0.0; capacity],
            capacity,
            index: 0,
            filled: 0,
            sum: 0.0,
        })
    }

    /// Records one latency sample; non-finite or negative values are
    /// dropped silently
    pub fn record(&mut self, ms: f64) {
        if !ms.is_finite() || ms < 0.0 {
            return;
        }
        if self.filled == self.capacity {
            self.sum -= self.buffer[self.index];
        } else {
            self.filled += 1;
        }
        self.buffer[self.index] = ms;
        self.sum += ms;
        self.index = (self.index + 1) % self.capacity;
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        if self.filled == 0 {
            return LatencySnapshot {
                mean: 0.0,
                p50: 0.0,
                p95: 0.0,
                count: 0,
            };
        }

        let mut sorted: Vec<f64> = self.buffer[..self.filled].to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        LatencySnapshot {
            mean: self.sum / self.filled as f64,
            p50: percentile(&sorted, 0.5),
            p95: percentile(&sorted, 0.95),
            count: self.filled,
        }
    }
}

/// Nearest-rank percentile over an ascending-sorted slice:
/// index = floor(p * (n - 1)), clamped to the valid range
fn percentile(sorted_asc: &[f64], p: f64) -> f64 {
    if sorted_asc.is_empty() {
        return 0.0;
    }
    let idx = ((p * (sorted_asc.len() - 1) as f64).floor() as usize).min(sorted_asc.len() - 1);
    sorted_asc[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_fails_construction() {
        assert!(LatencyTracker::new(0).is_err());
    }

    #[test]
    fn test_empty_snapshot() {
        let tracker = LatencyTracker::new(8).unwrap();
        let snap = tracker.snapshot();
        assert_eq!(snap.count, 0);
        assert_eq!(snap.mean, 0.0);
    }

    #[test]
    fn test_mean_and_percentiles() {
        let mut tracker = LatencyTracker::new(8).unwrap();
        for ms in [10.0, 20.0, 30.0, 40.0] {
            tracker.record(ms);
        }

        let snap = tracker.snapshot();
        assert_eq!(snap.count, 4);
        assert!((snap.mean - 25.0).abs() < f64::EPSILON);
        // nearest-rank: p50 index = floor(0.5 * 3) = 1, p95 index = floor(0.95 * 3) = 2
        assert_eq!(snap.p50, 20.0);
        assert_eq!(snap.p95, 30.0);
    }

    #[test]
    fn test_overwrite_maintains_running_sum() {
        let mut tracker = LatencyTracker::new(2).unwrap();
        tracker.record(100.0);
        tracker.record(200.0);
        // Overwrites the 100.0 slot; sum must drop it
        tracker.record(300.0);

        let snap = tracker.snapshot();
        assert_eq!(snap.count, 2);
        assert!((snap.mean - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let mut tracker = LatencyTracker::new(4).unwrap();
        tracker.record(-1.0);
        tracker.record(f64::NAN);
        tracker.record(f64::INFINITY);
        assert_eq!(tracker.snapshot().count, 0);

        tracker.record(5.0);
        assert_eq!(tracker.snapshot().count, 1);
    }

    #[test]
    fn test_single_sample_percentiles() {
        let mut tracker = LatencyTracker::new(4).unwrap();
        tracker.record(42.0);

        let snap = tracker.snapshot();
        assert_eq!(snap.p50, 42.0);
        assert_eq!(snap.p95, 42.0);
    }
}
