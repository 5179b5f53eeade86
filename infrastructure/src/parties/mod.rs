//! Built-in negotiation parties
//!
//! The strategy scripts are deliberately thin: they consume the
//! bid-space engine's outputs (utility ranges, interval queries) and
//! contain no protocol bookkeeping beyond remembering the standing
//! offer and their own votes.

mod conceder;
mod random_party;

pub use conceder::ConcederParty;
pub use random_party::RandomParty;

use parley_domain::{Action, Inform};

/// A negotiation party running inside the in-process transport.
///
/// The transport calls [`NegotiationParty::notify`] for every inform and
/// forwards the returned actions to the session. Parties learn their own
/// id and preferences from the `Settings` inform.
pub trait NegotiationParty: Send {
    fn notify(&mut self, inform: &Inform) -> Vec<Action>;
}
