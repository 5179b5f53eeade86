//! SAOP: the stacked alternating offers protocol
//!
//! Parties take turns in clockwise order. On its turn a party offers a
//! bid, accepts the standing offer or ends the negotiation. The session
//! reaches agreement when one offer is followed by an accept from every
//! other party.

mod settings;
mod state;

pub use settings::SaopSettings;
pub use state::SaopState;
