use serde::{Deserialize, Serialize};

/// Body of POST /api/pilots
///
/// `team` stays a raw string here so an unknown team name comes back as
/// a structured bad-request error instead of a body-deserialization
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotUpsertRequest {
    pub id: String,
    pub name: String,
    pub team: String,
}

/// Query string of GET /api/pilots
#[derive(Debug, Clone, Deserialize)]
pub struct PilotListQuery {
    pub team: Option<String>,
}

/// Query string of GET /api/pilots/latest
#[derive(Debug, Clone, Deserialize)]
pub struct LatestQuery {
    pub id: String,
}

/// Query string of GET /api/pilots/recent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    pub id: String,
    pub window_ms: Option<u64>,
}

/// Query string of GET /api/leaderboard
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub window_ms: Option<u64>,
}
