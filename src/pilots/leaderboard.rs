use serde::{Deserialize, Serialize};

use crate::domain::types::{Millis, PilotId, Position, Team};

/// One leaderboard entry. `points` is the aggregate over the requested
/// window; the remaining optional fields come from the pilot's most
/// recent sample and are absent for pilots with no telemetry yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub pilot_id: PilotId,
    pub pilot_name: String,
    pub team: Team,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_lap_ms: Option<Millis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<Millis>,
}

/// Sorts rows into final leaderboard order: points descending, ties
/// broken by most recent sample timestamp (rows without telemetry sort
/// last within their points bracket).
pub fn rank(mut rows: Vec<LeaderboardRow>) -> Vec<LeaderboardRow> {
    rows.sort_by(|a, b| {
        b.points.cmp(&a.points).then_with(|| {
            b.ts
                .unwrap_or(Millis(0))
                .cmp(&a.ts.unwrap_or(Millis(0)))
        })
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, points: u32, ts: Option<u64>) -> LeaderboardRow {
        LeaderboardRow {
            pilot_id: PilotId::new(id).unwrap(),
            pilot_name: id.to_string(),
            team: Team::Ferrari,
            points,
            position: None,
            last_lap_ms: None,
            anomaly: None,
            ts: ts.map(Millis),
        }
    }

    #[test]
    fn test_rank_orders_by_points_desc() {
        let ranked = rank(vec![
            row("a", 10, Some(1)),
            row("b", 25, Some(1)),
            row("c", 18, Some(1)),
        ]);
        let ids: Vec<&str> = ranked.iter().map(|r| r.pilot_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_breaks_ties_by_recency() {
        let ranked = rank(vec![
            row("stale", 10, Some(100)),
            row("fresh", 10, Some(200)),
        ]);
        assert_eq!(ranked[0].pilot_id.as_str(), "fresh");
    }

    #[test]
    fn test_rank_places_no_telemetry_last_within_bracket() {
        let ranked = rank(vec![row("quiet", 10, None), row("active", 10, Some(50))]);
        assert_eq!(ranked[0].pilot_id.as_str(), "active");
        assert_eq!(ranked[1].pilot_id.as_str(), "quiet");
    }

    #[test]
    fn test_row_omits_absent_fields() {
        let json = serde_json::to_value(row("a", 5, None)).unwrap();
        assert!(json.get("position").is_none());
        assert!(json.get("lastLapMs").is_none());
        assert_eq!(json["points"], 5);
    }
}
