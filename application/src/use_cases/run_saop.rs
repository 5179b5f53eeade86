//! SAOP protocol driver
//!
//! Runs one alternating-offers session end to end: connect all parties
//! (with bounded backoff), send settings, then hand out turns until an
//! agreement, an end-negotiation, the deadline or party exhaustion ends
//! the session.
//!
//! All state changes flow through one event queue. The deadline timer
//! posts a check event onto the same queue instead of touching state
//! from its own task, so a timer fire can never race an in-flight
//! action.

use super::{connect_with_backoff, now_ms, SessionError, TIME_MARGIN_MS};
use crate::ports::{ConnectionFactory, PartyConnection, SessionEvent};
use parley_domain::{
    Action, Inform, PartyId, Progress, ProtocolViolation, SaopSettings, SaopState, SessionResult,
    ViolationKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Capacity of the session event queue
const EVENT_QUEUE_SIZE: usize = 64;

/// Use case for running one SAOP session.
pub struct RunSaopUseCase<F: ConnectionFactory> {
    factory: Arc<F>,
}

impl<F: ConnectionFactory> RunSaopUseCase<F> {
    pub fn new(factory: Arc<F>) -> Self {
        Self { factory }
    }

    /// Run the session to completion and return its result. A session
    /// that cannot even start is an error; everything that happens
    /// in-session ends up in the result.
    pub async fn execute(&self, settings: SaopSettings) -> Result<SessionResult, SessionError> {
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        let connections = connect_with_backoff(
            self.factory.as_ref(),
            settings.participants(),
            events_tx.clone(),
        )
        .await?;

        let mut state = SaopState::new(settings.clone());
        for (connection, participant) in connections.iter().zip(settings.participants()) {
            state = state.with_party(connection.party_id().clone(), participant.clone())?;
        }

        let start_ms = now_ms();
        let progress = Progress::create(settings.deadline(), start_ms);
        state = state.with_progress(progress);
        info!(parties = connections.len(), "SAOP session starting");

        let deadline_at = start_ms + settings.deadline().duration_ms() + TIME_MARGIN_MS;
        let timer = spawn_deadline_timer(deadline_at, events_tx.clone());

        let mut session = SaopSession {
            state,
            connections,
            events: events_tx,
            awaiting: None,
            finished: false,
        };
        session.send_settings(&progress).await;
        session.next_turn().await;

        while !session.finished {
            let Some(event) = events_rx.recv().await else {
                // every sender is gone; nothing can change anymore
                session.finalize().await;
                break;
            };
            session.handle(event).await;
        }
        timer.abort();

        Ok(session.state.result())
    }
}

fn spawn_deadline_timer(
    deadline_at_ms: u64,
    events: mpsc::Sender<SessionEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let wait = deadline_at_ms.saturating_sub(now_ms());
        tokio::time::sleep(Duration::from_millis(wait)).await;
        let _ = events.send(SessionEvent::DeadlineCheck).await;
    })
}

/// One running SAOP session: the protocol state plus its connections.
struct SaopSession {
    state: SaopState,
    /// All connections made at start; kicked parties stay here so they
    /// still receive broadcasts and the final result
    connections: Vec<Arc<dyn PartyConnection>>,
    /// Send failures are posted back onto the session queue as
    /// ConnectionLost events, keeping all fault handling on one path
    events: mpsc::Sender<SessionEvent>,
    /// The party last prompted with YourTurn, to avoid double prompts
    /// after a kick
    awaiting: Option<PartyId>,
    finished: bool,
}

impl SaopSession {
    async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Action { party, action } => self.on_action(&party, action).await,
            SessionEvent::Malformed { party, detail } => {
                self.kick(
                    ProtocolViolation::new(party, ViolationKind::MalformedAction)
                        .with_detail(detail),
                )
                .await
            }
            SessionEvent::ConnectionLost { party, detail } => {
                self.kick(
                    ProtocolViolation::new(party, ViolationKind::ConnectionFailure)
                        .with_detail(detail),
                )
                .await
            }
            SessionEvent::DeadlineCheck => self.check_deadline().await,
        }
    }

    async fn on_action(&mut self, party: &PartyId, action: Action) {
        match self.state.with_action(party, action.clone()) {
            Ok(next) => {
                debug!(%action, "action applied");
                self.state = next;
                self.awaiting = None;
                self.broadcast(Inform::ActionDone { action }).await;
                if self.state.is_final(now_ms()) {
                    self.finalize().await;
                } else {
                    self.next_turn().await;
                }
            }
            Err(violation) => {
                warn!(%violation, "protocol violation");
                self.kick(violation).await;
            }
        }
    }

    /// Disconnect the offender. The session goes on with the survivors
    /// when at least 2 remain, otherwise it finalizes with the
    /// violation on record.
    async fn kick(&mut self, violation: ProtocolViolation) {
        let Some(party) = violation.party.clone() else {
            self.state = self.state.with_error(violation);
            self.finalize().await;
            return;
        };
        self.state = self.state.without_party(&party);
        if self.awaiting.as_ref() == Some(&party) {
            self.awaiting = None;
        }
        if self.state.connections().len() < 2 {
            info!(%party, "too few parties left, ending session");
            self.state = self.state.with_error(violation);
            self.finalize().await;
            return;
        }
        if self.state.is_final(now_ms()) {
            self.finalize().await;
        } else {
            self.next_turn().await;
        }
    }

    async fn check_deadline(&mut self) {
        if self.finished {
            return;
        }
        if self.state.is_final(now_ms()) {
            info!("SAOP deadline reached, terminating session");
            self.finalize().await;
        } else {
            // the timer only fires after deadline + margin
            error!("deadline check fired but state is not final");
        }
    }

    /// Prompt the party whose turn it is, unless already prompted.
    async fn next_turn(&mut self) {
        let Some(party) = self.state.next_actor().cloned() else {
            return;
        };
        if self.awaiting.as_ref() == Some(&party) {
            return;
        }
        self.awaiting = Some(party.clone());
        if let Err(e) = self.connection(&party).send(Inform::YourTurn).await {
            self.report_lost(party, e.to_string());
        }
    }

    /// Best-effort sequential broadcast; a send failure reports the
    /// party lost but never rolls back state already applied.
    async fn broadcast(&mut self, inform: Inform) {
        let mut failed: Vec<(PartyId, String)> = Vec::new();
        for connection in &self.connections {
            if let Err(e) = connection.send(inform.clone()).await {
                failed.push((connection.party_id().clone(), e.to_string()));
            }
        }
        for (party, detail) in failed {
            if self.state.connections().contains(&party) {
                self.report_lost(party, detail);
            }
        }
    }

    async fn send_settings(&mut self, progress: &Progress) {
        let mut failed: Vec<(PartyId, String)> = Vec::new();
        for connection in &self.connections {
            let party = connection.party_id().clone();
            let Some(participant) = self.state.party_profiles().get(&party).cloned() else {
                continue;
            };
            let settings = Inform::Settings {
                party: party.clone(),
                profile: Box::new(participant.profile),
                protocol: "SAOP".into(),
                progress: *progress,
                parameters: participant.parameters,
            };
            if let Err(e) = connection.send(settings).await {
                failed.push((party, e.to_string()));
            }
        }
        for (party, detail) in failed {
            self.report_lost(party, detail);
        }
    }

    /// Queue a connection loss for handling on the regular event path.
    fn report_lost(&self, party: PartyId, detail: String) {
        if let Err(e) = self
            .events
            .try_send(SessionEvent::ConnectionLost { party, detail })
        {
            error!(error = %e, "could not queue connection loss");
        }
    }

    /// Send the final result to everyone and close up. Guarded so that
    /// concurrent deadline fires and actions can never finalize twice.
    async fn finalize(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let agreements = self.state.agreements();
        info!(agreements = agreements.len(), "SAOP session finished");
        let finished = Inform::Finished { agreements };
        for connection in &self.connections {
            if let Err(e) = connection.send(finished.clone()).await {
                info!(party = %connection.party_id(), error = %e, "failed to send Finished");
            }
            connection.close().await;
        }
    }

    fn connection(&self, party: &PartyId) -> Arc<dyn PartyConnection> {
        self.connections
            .iter()
            .find(|c| c.party_id() == party)
            .cloned()
            .expect("connection exists for every known party")
    }
}
