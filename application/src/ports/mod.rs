//! Ports: the interfaces the drivers need from the outside world

mod connection;
mod events;
mod profile_source;

pub use connection::{ConnectError, ConnectionError, ConnectionFactory, PartyConnection};
pub use events::SessionEvent;
pub use profile_source::{ProfileError, ProfileSource};
