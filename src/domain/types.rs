use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Errors raised when a domain value fails its construction invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("pilot id must be a non-empty string")]
    EmptyPilotId,

    #[error("pilot name must be a non-empty string")]
    EmptyPilotName,

    #[error("position must be between {min} and {max}, got {got}", min = Position::MIN, max = Position::MAX)]
    PositionOutOfRange { got: u32 },
}

/// Milliseconds quantity (lap durations, timestamps, windows)
///
/// Newtype so a raw `u64` cannot be passed where a millisecond value is
/// expected. Non-negativity is enforced by the underlying type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Saturating subtraction, used when deriving window cutoffs
    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }
}

impl From<u64> for Millis {
    fn from(v: u64) -> Self {
        Millis(v)
    }
}

/// Current wall-clock time in milliseconds since epoch
pub fn now_ms() -> Millis {
    Millis(chrono::Utc::now().timestamp_millis().max(0) as u64)
}

/// Opaque pilot identifier, non-empty by construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PilotId(String);

impl PilotId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyPilotId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PilotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Race position, valid range 1..=20
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(u8);

impl Position {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 20;

    pub fn new(pos: u32) -> Result<Self, DomainError> {
        if pos < Self::MIN as u32 || pos > Self::MAX as u32 {
            return Err(DomainError::PositionOutOfRange { got: pos });
        }
        Ok(Self(pos as u8))
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed enumeration of constructors fielding cars this season
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Team {
    Ferrari,
    Mercedes,
    RedBull,
    McLaren,
    AstonMartin,
    Alpine,
    Williams,
    RB,
    Sauber,
    Haas,
}
