//! Session event queue types

use parley_domain::{Action, PartyId};

/// One event on a session's serialized queue.
///
/// Everything that can change a session's state arrives here: inbound
/// party actions, connection-level faults reported by the transport and
/// the deadline timer's check requests. The driver consumes the queue
/// one event at a time, so a transition is never applied against a stale
/// state and the timer never races an in-flight action.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A party did something
    Action { party: PartyId, action: Action },
    /// A party sent something that did not parse into an action
    Malformed { party: PartyId, detail: String },
    /// The transport lost a party
    ConnectionLost { party: PartyId, detail: String },
    /// A timer asks the driver to check its deadlines
    DeadlineCheck,
}
