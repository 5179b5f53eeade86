//! Protocol-to-party notifications
//!
//! The messages a protocol sends to its parties, as one tagged sum. The
//! transport layer only moves these around; the meaning lives here.

use crate::actions::{Action, Votes};
use crate::error::DomainError;
use crate::issue::Bid;
use crate::party::PartyId;
use crate::profile::LinearAdditiveUtilitySpace;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The agreements reached in a negotiation. Each party agrees on at most
/// one bid; every agreement involves at least two parties (enforced by
/// the protocols that build these).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreements {
    agreements: BTreeMap<PartyId, Bid>,
}

impl Agreements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(agreements: impl IntoIterator<Item = (PartyId, Bid)>) -> Self {
        Self {
            agreements: agreements.into_iter().collect(),
        }
    }

    /// Merge with `other`. A party occurring in both is an error.
    pub fn merged_with(&self, other: &Agreements) -> Result<Agreements, DomainError> {
        let mut merged = self.agreements.clone();
        for (party, bid) in &other.agreements {
            if merged.insert(party.clone(), bid.clone()).is_some() {
                return Err(DomainError::AgreementConflict(party.to_string()));
            }
        }
        Ok(Agreements { agreements: merged })
    }

    pub fn bid_of(&self, party: &PartyId) -> Option<&Bid> {
        self.agreements.get(party)
    }

    pub fn parties(&self) -> impl Iterator<Item = &PartyId> {
        self.agreements.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartyId, &Bid)> {
        self.agreements.iter()
    }

    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

impl std::fmt::Display for Agreements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Agreements[")?;
        for (i, (party, bid)) in self.agreements.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{party}:{bid}")?;
        }
        write!(f, "]")
    }
}

/// Free-form party parameters from the session settings (e.g. voting
/// `power`, concession exponent).
pub type Parameters = BTreeMap<String, serde_json::Value>;

/// A message from the protocol to one party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inform {
    /// First message: who you are, what you want, how long you have
    Settings {
        party: PartyId,
        profile: Box<LinearAdditiveUtilitySpace>,
        protocol: String,
        progress: Progress,
        parameters: Parameters,
    },
    /// Some party completed an action
    ActionDone { action: Action },
    /// It is this party's turn to act
    YourTurn,
    /// All offers of this round; place your votes
    Voting {
        offers: Vec<Action>,
        powers: BTreeMap<PartyId, u32>,
    },
    /// All votes of this round; extend yours if you wish
    OptIn { votes: Vec<Votes> },
    /// The session ended; these are the final agreements
    Finished { agreements: Agreements },
}

impl Inform {
    pub fn kind(&self) -> &'static str {
        match self {
            Inform::Settings { .. } => "Settings",
            Inform::ActionDone { .. } => "ActionDone",
            Inform::YourTurn => "YourTurn",
            Inform::Voting { .. } => "Voting",
            Inform::OptIn { .. } => "OptIn",
            Inform::Finished { .. } => "Finished",
        }
    }
}
