use std::time::Duration;
use thiserror::Error;

use crate::domain::types::Millis;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid number: \"{value}\"")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {got}")]
    OutOfRange {
        name: &'static str,
        min: u64,
        max: u64,
        got: u64,
    },

    #[error("CORS_ORIGIN entries must be \"*\" or http(s) origins: \"{0}\"")]
    BadCorsOrigin(String),

    #[error("{name} must be \"true\" or \"false\", got \"{value}\"")]
    NotABool { name: &'static str, value: String },
}

/// Server configuration sourced from the environment. Missing variables
/// take documented defaults; present-but-invalid values are startup
/// errors rather than silent fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// "*" or an explicit list of allowed origins
    pub cors_origins: Vec<String>,
    pub ring_buffer_capacity: usize,
    pub history_window_ms: Millis,
    pub heartbeat_interval: Duration,
    pub simulator_enabled: bool,
    pub simulator_period: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_u64("PORT", std::env::var("PORT").ok(), 8080, 1, 65_535)? as u16,
            cors_origins: parse_cors(std::env::var("CORS_ORIGIN").ok())?,
            ring_buffer_capacity: parse_u64(
                "RING_BUFFER_CAPACITY",
                std::env::var("RING_BUFFER_CAPACITY").ok(),
                1_000,
                10,
                1_000_000,
            )? as usize,
            history_window_ms: Millis(parse_u64(
                "HISTORY_WINDOW_MS",
                std::env::var("HISTORY_WINDOW_MS").ok(),
                300_000,
                1_000,
                u64::MAX,
            )?),
            heartbeat_interval: Duration::from_millis(parse_u64(
                "HEARTBEAT_INTERVAL_MS",
                std::env::var("HEARTBEAT_INTERVAL_MS").ok(),
                15_000,
                100,
                600_000,
            )?),
            simulator_enabled: parse_bool(
                "SIMULATOR_ENABLED",
                std::env::var("SIMULATOR_ENABLED").ok(),
                false,
            )?,
            simulator_period: Duration::from_millis(parse_u64(
                "SIMULATOR_PERIOD_MS",
                std::env::var("SIMULATOR_PERIOD_MS").ok(),
                2_000,
                100,
                60_000,
            )?),
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_u64(
    name: &'static str,
    raw: Option<String>,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::NotANumber { name, value: raw })?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            min,
            max,
            got: value,
        });
    }
    Ok(value)
}

fn parse_bool(
    name: &'static str,
    raw: Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::NotABool { name, value: raw }),
    }
}

/// Parses a comma-separated origin list. Each entry must be `*` or an
/// http(s) origin.
fn parse_cors(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(vec!["*".to_string()]);
    };

    let mut origins = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if entry != "*" && !entry.starts_with("http://") && !entry.starts_with("https://") {
            return Err(ConfigError::BadCorsOrigin(entry.to_string()));
        }
        origins.push(entry.to_string());
    }

    if origins.is_empty() {
        return Err(ConfigError::BadCorsOrigin(raw));
    }
    Ok(origins)
}
