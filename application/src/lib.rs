//! Application layer for parley
//!
//! Use cases (the SAOP and MOPAC protocol drivers) and the ports they
//! need: party connections, a connection factory and a profile source.
//! The drivers own all session concurrency: party actions and timer
//! fires arrive as events on one queue per session and are applied
//! strictly one at a time against the immutable protocol state.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    ConnectError, ConnectionError, ConnectionFactory, PartyConnection, ProfileError,
    ProfileSource, SessionEvent,
};
pub use use_cases::{RunMopacUseCase, RunSaopUseCase, SessionError};
