//! Session protocol state machines
//!
//! Both protocol families share one architectural shape: an immutable
//! state value plus a driver (in the application layer) that feeds it
//! party actions. A state transition never mutates; it builds the next
//! state. Misbehavior by one party becomes a [`ProtocolViolation`]
//! attributed to that party and never corrupts the session state for the
//! others; internal invariant breaks are bugs, logged loudly by the
//! driver and never downgraded to a kicked-party event.

pub mod mopac;
pub mod saop;

use crate::inform::{Agreements, Parameters};
use crate::party::PartyId;
use crate::profile::LinearAdditiveUtilitySpace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a party did wrong. Expected, recoverable-at-session-level events;
/// the offender is kicked and the session continues when enough parties
/// remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// Acted while another party had the turn
    OutOfTurn,
    /// Action type not allowed in the current protocol or phase
    ActionNotAllowed,
    /// Accepted a bid that differs from the most recent offer
    AcceptMismatch,
    /// Accepted while no offer stands
    NoRecentOffer,
    /// The action's actor field does not match the acting connection
    WrongCredentials,
    /// Acted again in a phase where each party acts once
    AlreadyActed,
    /// Acted after the phase or session deadline
    PastDeadline,
    /// New votes do not extend the previous votes
    NotExtending,
    /// Sent nothing, or something unintelligible
    MalformedAction,
    /// The connection to the party failed
    ConnectionFailure,
    /// Failed to act before the phase ended
    NoAction,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ViolationKind::OutOfTurn => "party acts without having the turn",
            ViolationKind::ActionNotAllowed => "action not allowed",
            ViolationKind::AcceptMismatch => "accept differs from the last offer",
            ViolationKind::NoRecentOffer => "accept without a recent offer",
            ViolationKind::WrongCredentials => "action carries wrong credentials",
            ViolationKind::AlreadyActed => "party can not act anymore",
            ViolationKind::PastDeadline => "passed deadline",
            ViolationKind::NotExtending => "votes do not extend the previous votes",
            ViolationKind::MalformedAction => "malformed or missing action",
            ViolationKind::ConnectionFailure => "connection failure",
            ViolationKind::NoAction => "party did not act",
        };
        write!(f, "{text}")
    }
}

/// A protocol rule broken by (usually) a known party.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolViolation {
    /// The offending party; None only when the fault cannot be
    /// attributed, e.g. a failure before connections exist
    pub party: Option<PartyId>,
    pub kind: ViolationKind,
    pub detail: String,
}

impl std::fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let party = self.party.as_ref().map_or("unknown", |p| p.name());
        write!(f, "{party}: {}", self.kind)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl ProtocolViolation {
    pub fn new(party: PartyId, kind: ViolationKind) -> Self {
        Self {
            party: Some(party),
            kind,
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn unattributed(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            party: None,
            kind,
            detail: detail.into(),
        }
    }
}

/// One participant slot in the session settings: which party
/// implementation to run, its preference profile and free-form
/// parameters (e.g. voting `power`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyWithProfile {
    /// Reference resolved by the connection factory, e.g. a builtin
    /// party name
    pub party_ref: String,
    pub profile: LinearAdditiveUtilitySpace,
    #[serde(default)]
    pub parameters: Parameters,
}

impl PartyWithProfile {
    pub fn new(party_ref: impl Into<String>, profile: LinearAdditiveUtilitySpace) -> Self {
        Self {
            party_ref: party_ref.into(),
            profile,
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// This party's voting power: integer parameter `power`, default 1,
    /// values below 1 or of the wrong type coerced to 1.
    pub fn power(&self) -> u32 {
        self.parameters
            .get("power")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v >= 1)
            .unwrap_or(1)
    }
}

/// The outcome of one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub agreements: Agreements,
    pub error: Option<ProtocolViolation>,
}
