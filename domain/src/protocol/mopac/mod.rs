//! MOPAC: multiple offers, voting and opting in
//!
//! A repeating three-phase cycle. In the offer phase every active party
//! submits one offer; in the voting phase all offers are broadcast and
//! every party votes conditionally on the bids it can live with; in the
//! opt-in phase all votes are broadcast and parties may widen (never
//! shrink) their votes. At opt-in finish a
//! [`VotingEvaluator`](crate::voting::VotingEvaluator) extracts
//! power-weighted agreements; agreeing parties leave the pool and the
//! remainder loops back to a fresh offer phase while time and numbers
//! permit.

mod party_states;
mod phase;
mod settings;
mod state;

pub use party_states::PartyStates;
pub use phase::{Phase, PHASE_MAXTIME_MS, PHASE_MINTIME_MS};
pub use settings::MopacSettings;
pub use state::MopacState;
