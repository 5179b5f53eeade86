//! Infrastructure layer for parley
//!
//! Adapters behind the application-layer ports: an in-process transport
//! that runs parties as tokio tasks, a JSON file profile source, a JSONL
//! session trace writer and the built-in negotiation parties.

pub mod logging;
pub mod parties;
pub mod profiles;
pub mod transport;

// Re-export commonly used types
pub use logging::TracingConnectionFactory;
pub use parties::{ConcederParty, NegotiationParty, RandomParty};
pub use profiles::FileProfileSource;
pub use transport::{InProcessConnectionFactory, PartyRegistry};
