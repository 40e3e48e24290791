pub mod events;
pub mod handlers;
pub mod hub;

pub use events::RaceEvent;
pub use hub::SseHub;
