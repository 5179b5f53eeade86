//! Domain layer for parley
//!
//! This crate contains the core negotiation model: issue values and bids,
//! weighted additive utility profiles, the bid-space utility engine, the
//! pareto frontier engines and the session protocol state machines. It has
//! no dependencies on transport or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Bid space
//!
//! A [`Domain`] assigns every negotiable issue a finite [`ValueSet`]. The
//! bid space is the cartesian product of those sets and is usually far too
//! large to materialize. [`BidsWithUtility`] answers utility-interval
//! queries over that space by recursive decomposition, and
//! [`ParetoLinearAdditive`] extracts pareto frontiers by divide and conquer
//! over the issue list.
//!
//! ## Protocols
//!
//! Two session protocols share one architectural shape, an immutable state
//! value replaced on every accepted action:
//!
//! - **SAOP**: alternating offers, unanimous accept of the standing offer
//! - **MOPAC**: repeated offer / vote / opt-in phases with power-weighted
//!   consensus extraction

pub mod actions;
pub mod bidspace;
pub mod error;
pub mod inform;
pub mod issue;
pub mod party;
pub mod profile;
pub mod progress;
pub mod protocol;
pub mod voting;

// Re-export commonly used types
pub use actions::{Action, Vote, Votes};
pub use bidspace::{
    AllBidsList, BidList, BidsWithUtility, GenericPareto, Interval, ParetoLinearAdditive,
    ParetoPoint, DEFAULT_PRECISION,
};
pub use error::DomainError;
pub use inform::{Agreements, Inform, Parameters};
pub use issue::{Bid, Domain, Value, ValueSet};
pub use party::PartyId;
pub use profile::{LinearAdditiveUtilitySpace, PartialOrdering, ValueSetUtilities};
pub use progress::{Deadline, Progress};
pub use protocol::{
    mopac::{MopacSettings, MopacState, PartyStates, Phase, PHASE_MAXTIME_MS, PHASE_MINTIME_MS},
    saop::{SaopSettings, SaopState},
    PartyWithProfile, ProtocolViolation, SessionResult, ViolationKind,
};
pub use voting::{CollectedVotes, VotingEvaluator};
