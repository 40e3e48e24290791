pub mod race_store;
pub mod repository;
pub mod ring_buffer;

pub use race_store::{RaceDataStore, StoreError};
pub use repository::{InMemoryRaceRepository, PilotFallback, RaceRepository};
pub use ring_buffer::{RingBuffer, TimeStamped};
