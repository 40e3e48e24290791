pub mod handlers;
pub mod leaderboard;
pub mod service;
pub mod types;

pub use leaderboard::LeaderboardRow;
pub use service::PilotService;
