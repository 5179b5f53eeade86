//! Use cases: the protocol drivers

mod run_mopac;
mod run_saop;

pub use run_mopac::RunMopacUseCase;
pub use run_saop::RunSaopUseCase;

use crate::ports::{ConnectError, ConnectionFactory, PartyConnection, SessionEvent};
use parley_domain::{DomainError, PartyWithProfile};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::mpsc;

/// Lower bound on the connect-retry backoff
pub(crate) const MIN_SLEEP_TIME_MS: u64 = 1_000;
/// Upper bound on the connect-retry backoff
pub(crate) const MAX_SLEEP_TIME_MS: u64 = 60_000;
/// Extra delay after the deadline before the timer checks, so the check
/// never runs early
pub(crate) const TIME_MARGIN_MS: u64 = 20;

/// Errors that keep a session from running at all. Party misbehavior is
/// not in here: that is handled inside the session and shows up in the
/// [`SessionResult`](parley_domain::SessionResult).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to connect parties: {0}")]
    ConnectFailed(String),

    #[error("invalid session settings: {0}")]
    InvalidSettings(#[from] DomainError),
}

/// Current wall-clock time in ms since the unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Connect all parties, backing off on the distinguished
/// no-resources-now condition. Sleeps are clamped to
/// [`MIN_SLEEP_TIME_MS`], [`MAX_SLEEP_TIME_MS`].
pub(crate) async fn connect_with_backoff(
    factory: &dyn ConnectionFactory,
    participants: &[PartyWithProfile],
    events: mpsc::Sender<SessionEvent>,
) -> Result<Vec<Arc<dyn PartyConnection>>, SessionError> {
    loop {
        match factory.connect_all(participants, events.clone()).await {
            Ok(connections) => return Ok(connections),
            Err(ConnectError::NoResourcesNow { retry_at_ms }) => {
                let wait_ms = retry_at_ms
                    .saturating_sub(now_ms())
                    .clamp(MIN_SLEEP_TIME_MS, MAX_SLEEP_TIME_MS);
                tracing::info!(wait_ms, "no resources available to run session, waiting");
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            Err(ConnectError::Failed(detail)) => {
                return Err(SessionError::ConnectFailed(detail));
            }
        }
    }
}
