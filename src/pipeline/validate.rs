use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::domain::types::{Position, Team};

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type ValidationErrors = Vec<FieldError>;

/// Shape-validated ingestion payload. Strings are still raw here; the
/// sanitize and lap-time stages refine them further.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleInput {
    pub pilot_id: String,
    pub pilot_name: String,
    pub team: Team,
    pub current_position: Position,
    pub last_lap_time: String,
    /// Raw points reported by the source; recomputed by the pipeline, so
    /// only shape-checked
    pub current_race_points: Option<String>,
    pub anomaly_detected: Option<bool>,
}

/// Validates an untyped payload against the domain constraints.
///
/// Every field is checked rather than short-circuiting on the first
/// failure, so the caller receives a complete error report.
pub fn validate_shape(input: &Value) -> Result<SampleInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let Some(obj) = input.as_object() else {
        return Err(vec![FieldError::new("$", "Body must be a JSON object")]);
    };

    let pilot_id = non_empty_string(obj.get("pilotId"));
    if pilot_id.is_none() {
        errors.push(FieldError::new(
            "pilotId",
            "pilotId must be a non-empty string",
        ));
    }

    let pilot_name = non_empty_string(obj.get("pilotName"));
    if pilot_name.is_none() {
        errors.push(FieldError::new(
            "pilotName",
            "pilotName must be a non-empty string",
        ));
    }

    let team = as_team(obj.get("team"));
    if team.is_none() {
        errors.push(FieldError::new(
            "team",
            "team must be one of the known constructors",
        ));
    }

    let current_position = as_position(obj.get("currentPosition"));
    if current_position.is_none() {
        errors.push(FieldError::new(
            "currentPosition",
            format!(
                "currentPosition must be an integer between {} and {}",
                Position::MIN,
                Position::MAX
            ),
        ));
    }

    let last_lap_time = as_lap_time_string(obj.get("lastLapTime"));
    if last_lap_time.is_none() {
        errors.push(FieldError::new(
            "lastLapTime",
            "lastLapTime must be in format \"M:SS.mmm\", \"S.mmm\" or raw milliseconds",
        ));
    }

    let raw_points = obj.get("currentRacePoints");
    let current_race_points = as_optional_numeric_string(raw_points);
    if raw_points.is_some() && raw_points != Some(&Value::Null) && current_race_points.is_none() {
        errors.push(FieldError::new(
            "currentRacePoints",
            "currentRacePoints must be a numeric string or number",
        ));
    }

    let raw_anomaly = obj.get("anomalyDetected");
    let anomaly_detected = as_optional_boolean(raw_anomaly);
    if raw_anomaly.is_some() && raw_anomaly != Some(&Value::Null) && anomaly_detected.is_none() {
        errors.push(FieldError::new(
            "anomalyDetected",
            "anomalyDetected must be boolean or \"true/false/1/0/yes/no\"",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // All options were checked above; the unwraps cannot fire
    Ok(SampleInput {
        pilot_id: pilot_id.unwrap(),
        pilot_name: pilot_name.unwrap(),
        team: team.unwrap(),
        current_position: current_position.unwrap(),
        last_lap_time: last_lap_time.unwrap(),
        current_race_points,
        anomaly_detected,
    })
}

fn non_empty_string(v: Option<&Value>) -> Option<String> {
    let s = v?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(s.to_string())
}

fn as_team(v: Option<&Value>) -> Option<Team> {
    let s = v?.as_str()?;
    Team::from_str(s.trim()).ok()
}

fn as_position(v: Option<&Value>) -> Option<Position> {
    // Accepts 7 or "7"
    let n = match v? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    Position::new(u32::try_from(n).ok()?).ok()
}

fn as_lap_time_string(v: Option<&Value>) -> Option<String> {
    // Superficial check only: digits, colon, dot. Exact shape is the
    // lap-time codec's concern.
    let s = v?.as_str()?.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == ':' || c == '.') {
        return None;
    }
    Some(s.to_string())
}

fn as_optional_boolean(v: Option<&Value>) -> Option<bool> {
    match v? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_optional_numeric_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let t = s.trim();
            if !t.is_empty() && t.chars().all(|c| c.is_ascii_digit() || c == '.') {
                Some(t.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "pilotId": "lec16",
            "pilotName": "Charles Leclerc",
            "team": "Ferrari",
            "currentPosition": 1,
            "lastLapTime": "1:21.345"
        })
    }

    #[test]
    fn test_valid_payload_passes() {
        let input = validate_shape(&valid()).unwrap();
        assert_eq!(input.pilot_id, "lec16");
        assert_eq!(input.team, Team::Ferrari);
        assert_eq!(input.current_position.as_u8(), 1);
        assert_eq!(input.current_race_points, None);
        assert_eq!(input.anomaly_detected, None);
    }

    #[test]
    fn test_non_object_body() {
        let errors = validate_shape(&json!("not an object")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$");
    }

    #[test]
    fn test_missing_team_reports_team_path() {
        let mut payload = valid();
        payload.as_object_mut().unwrap().remove("team");

        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "team"));
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(21))]
    #[case(json!(-3))]
    #[case(json!("zero"))]
    #[case(json!(1.5))]
    fn test_invalid_positions(#[case] position: Value) {
        let mut payload = valid();
        payload["currentPosition"] = position;

        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "currentPosition"));
    }

    #[test]
    fn test_position_accepts_numeric_string() {
        let mut payload = valid();
        payload["currentPosition"] = json!("7");

        let input = validate_shape(&payload).unwrap();
        assert_eq!(input.current_position.as_u8(), 7);
    }

    #[test]
    fn test_doubly_invalid_payload_reports_both_fields() {
        let mut payload = valid();
        payload.as_object_mut().unwrap().remove("team");
        payload["currentPosition"] = json!(0);

        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "team"));
        assert!(errors.iter().any(|e| e.path == "currentPosition"));
    }

    #[rstest]
    #[case(json!(true), Some(true))]
    #[case(json!("yes"), Some(true))]
    #[case(json!("1"), Some(true))]
    #[case(json!(false), Some(false))]
    #[case(json!("no"), Some(false))]
    fn test_anomaly_flag_forms(#[case] raw: Value, #[case] expected: Option<bool>) {
        let mut payload = valid();
        payload["anomalyDetected"] = raw;

        let input = validate_shape(&payload).unwrap();
        assert_eq!(input.anomaly_detected, expected);
    }

    #[test]
    fn test_bad_anomaly_flag_rejected() {
        let mut payload = valid();
        payload["anomalyDetected"] = json!("maybe");

        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "anomalyDetected"));
    }

    #[test]
    fn test_lap_time_with_letters_rejected() {
        let mut payload = valid();
        payload["lastLapTime"] = json!("not-a-time");

        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "lastLapTime"));
    }

    #[test]
    fn test_race_points_accepts_number_and_numeric_string() {
        let mut payload = valid();
        payload["currentRacePoints"] = json!(18);
        assert_eq!(
            validate_shape(&payload).unwrap().current_race_points,
            Some("18".to_string())
        );

        payload["currentRacePoints"] = json!("18.5");
        assert_eq!(
            validate_shape(&payload).unwrap().current_race_points,
            Some("18.5".to_string())
        );

        payload["currentRacePoints"] = json!("lots");
        let errors = validate_shape(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "currentRacePoints"));
    }
}
