//! SAOP session settings

use crate::error::DomainError;
use crate::progress::Deadline;
use crate::protocol::PartyWithProfile;
use serde::{Deserialize, Serialize};

/// Sessions shorter than this make no sense
pub const MIN_DURATION_MS: u64 = 100;

/// Fixed configuration of one SAOP session: the participants, in turn
/// order, and the deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaopSettings {
    participants: Vec<PartyWithProfile>,
    deadline: Deadline,
}

impl SaopSettings {
    pub fn new(
        participants: Vec<PartyWithProfile>,
        deadline: Deadline,
    ) -> Result<Self, DomainError> {
        if deadline.duration_ms() < MIN_DURATION_MS {
            return Err(DomainError::DeadlineTooShort {
                min_ms: MIN_DURATION_MS,
                got_ms: deadline.duration_ms(),
            });
        }
        Ok(Self {
            participants,
            deadline,
        })
    }

    pub fn participants(&self) -> &[PartyWithProfile] {
        &self.participants
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }
}
