//! Power-weighted consensus evaluation
//!
//! After a MOPAC opt-in phase the protocol holds one ballot per party.
//! [`CollectedVotes`] finds, per bid, the maximum-power subset of parties
//! whose vote conditions are all satisfied; a [`VotingEvaluator`] turns
//! those subsets into agreements.

mod collected;
mod evaluator;

pub use collected::CollectedVotes;
pub use evaluator::VotingEvaluator;
