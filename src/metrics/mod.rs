pub mod handlers;
pub mod latency;
pub mod service;
pub mod tps;

pub use latency::{LatencySnapshot, LatencyTracker};
pub use service::{MetricsError, MetricsService, MetricsSnapshot};
pub use tps::TpsCounter;
