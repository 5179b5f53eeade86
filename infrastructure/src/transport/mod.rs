//! In-process transport
//!
//! Runs every party as a tokio task with its own inform inbox. Outbound
//! actions flow onto the session event queue the driver provided at
//! connect time, so the protocol sees one serialized stream of events no
//! matter how many parties act at once.

mod factory;

pub use factory::{InProcessConnectionFactory, PartyRegistry};
