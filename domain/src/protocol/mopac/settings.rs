//! MOPAC session settings

use crate::error::DomainError;
use crate::progress::Deadline;
use crate::protocol::PartyWithProfile;
use crate::voting::VotingEvaluator;
use serde::{Deserialize, Serialize};

/// Sessions shorter than this make no sense
pub const MIN_DURATION_MS: u64 = 100;

/// Fixed configuration of one MOPAC session: participants, deadline and
/// the agreement-extraction strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MopacSettings {
    participants: Vec<PartyWithProfile>,
    deadline: Deadline,
    #[serde(default)]
    evaluator: VotingEvaluator,
}

impl MopacSettings {
    pub fn new(
        participants: Vec<PartyWithProfile>,
        deadline: Deadline,
        evaluator: VotingEvaluator,
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
            evaluator,
        })
    }

    pub fn participants(&self) -> &[PartyWithProfile] {
        &self.participants
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn evaluator(&self) -> &VotingEvaluator {
        &self.evaluator
    }
}
