use serde::{Deserialize, Serialize};

use super::types::{DomainError, PilotId, Team};

/// A tracked competitor. The id is immutable; name and team may change
/// across upserts (a team change updates the store's team index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    pub id: PilotId,
    pub name: String,
    pub team: Team,
}

impl Pilot {
    pub fn new(id: PilotId, name: impl Into<String>, team: Team) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::EmptyPilotName);
        }
        Ok(Self { id, name, team })
    }
}
