//! Domain error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised at construction time of domain objects.
///
/// These are configuration errors: fatal to the construction that raised
/// them and never recoverable by retrying. Protocol-level misbehavior is a
/// separate concern, see
/// [`ProtocolViolation`](crate::protocol::ProtocolViolation).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("name '{0}' must be non-empty and contain only a-z, A-Z, 0-9")]
    InvalidName(String),

    #[error("domain must have at least one issue")]
    NoIssues,

    #[error("issue '{0}' has an empty value set")]
    EmptyValueSet(String),

    #[error("party id '{0}' must be a letter followed by word characters")]
    InvalidPartyId(String),

    #[error("discrete value must be a non-empty string")]
    EmptyDiscreteValue,

    #[error("bids overlap on issues: {0}")]
    OverlappingIssues(String),

    #[error("bid does not fit domain: {0}")]
    BidNotFitting(String),

    #[error("bid is not complete: {0}")]
    BidNotComplete(String),

    #[error("utility {0} is outside [0,1]")]
    UtilityOutOfRange(Decimal),

    #[error("high value must be above low value in a numeric utility function")]
    DegenerateValueRange,

    #[error("utilities do not fit the value set: {0}")]
    UtilitiesNotFitting(String),

    #[error("issues in {part} ({found}) do not match issues in domain ({expected})")]
    IssueSetMismatch {
        part: &'static str,
        found: String,
        expected: String,
    },

    #[error("issue weights sum to {0}, must sum to exactly 1")]
    WeightsNotNormalized(Decimal),

    #[error("reservation bid does not fit domain: {0}")]
    ReservationBidNotFitting(String),

    #[error("at least {needed} profiles are required, got {got}")]
    TooFewProfiles { needed: usize, got: usize },

    #[error("all profiles must share domain '{expected}' but found '{found}'")]
    ProfileDomainMismatch { expected: String, found: String },

    #[error("a vote needs 1 <= min power <= max power, got [{min},{max}]")]
    InvalidPowerWindow { min: u32, max: u32 },

    #[error("votes contain more than one vote for bid {0}")]
    DuplicateVote(String),

    #[error("vote by {found} in votes submitted by {expected}")]
    ForeignVote { expected: String, found: String },

    #[error("party {0} already has an agreement")]
    AgreementConflict(String),

    #[error("deadline duration must be at least {min_ms}ms, got {got_ms}ms")]
    DeadlineTooShort { min_ms: u64, got_ms: u64 },
}
