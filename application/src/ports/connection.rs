//! Party connection ports

use super::events::SessionEvent;
use async_trait::async_trait;
use parley_domain::{Inform, PartyId, PartyWithProfile};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// A connection-level failure. Side-channel signal, never a party
/// action; the driver records it against the party and moves on.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    #[error("party disconnected: {0}")]
    Disconnected(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Errors from starting up a session's connections.
#[derive(Error, Debug, Clone)]
pub enum ConnectError {
    /// The substrate has no capacity right now; retry no earlier than
    /// `retry_at_ms` (epoch ms). The driver backs off and retries the
    /// whole connect step.
    #[error("no resources to start all parties, retry at {retry_at_ms}")]
    NoResourcesNow { retry_at_ms: u64 },

    /// Starting the parties failed for good
    #[error("failed to connect parties: {0}")]
    Failed(String),
}

/// The driver's handle to one connected party: outbound informs only.
/// Inbound actions arrive on the session event queue the factory was
/// given at connect time.
#[async_trait]
pub trait PartyConnection: Send + Sync {
    /// The id the factory assigned to this party
    fn party_id(&self) -> &PartyId;

    /// Deliver an inform to the party
    async fn send(&self, inform: Inform) -> Result<(), ConnectionError>;

    /// Tear the connection down. Idempotent, best effort.
    async fn close(&self);
}

/// Creates the party connections for one session.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Connect all participants, wiring each party's outbound actions to
    /// `events`. Returns one connection per participant, in order. All
    /// or nothing: a partial success frees what it started and reports
    /// an error.
    async fn connect_all(
        &self,
        participants: &[PartyWithProfile],
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Vec<Arc<dyn PartyConnection>>, ConnectError>;
}
