pub mod pilot;
pub mod sample;
pub mod types;

pub use pilot::Pilot;
pub use sample::RaceSample;
pub use types::{now_ms, DomainError, Millis, PilotId, Position, Team};
