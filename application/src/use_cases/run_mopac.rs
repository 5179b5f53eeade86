//! MOPAC protocol driver
//!
//! Runs one offer/vote/opt-in session end to end. Phase-driven: each
//! phase opens with an inform to every active party and a timer on the
//! phase deadline; the phase closes as soon as everybody acted or the
//! timer posts its check. Both paths go through the same event queue,
//! so a phase is never closed twice and never against a stale state.

use super::{connect_with_backoff, now_ms, SessionError};
use crate::ports::{ConnectionFactory, PartyConnection, SessionEvent};
use parley_domain::{
    Inform, MopacSettings, MopacState, PartyId, Progress, ProtocolViolation, SessionResult,
    ViolationKind,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the session event queue
const EVENT_QUEUE_SIZE: usize = 64;

/// Use case for running one MOPAC session.
pub struct RunMopacUseCase<F: ConnectionFactory> {
    factory: Arc<F>,
}

impl<F: ConnectionFactory> RunMopacUseCase<F> {
    pub fn new(factory: Arc<F>) -> Self {
        Self { factory }
    }

    /// Run the session to completion and return its result.
    pub async fn execute(&self, settings: MopacSettings) -> Result<SessionResult, SessionError> {
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        let connections = connect_with_backoff(
            self.factory.as_ref(),
            settings.participants(),
            events_tx.clone(),
        )
        .await?;

        let mut state = MopacState::new(settings.clone());
        for (connection, participant) in connections.iter().zip(settings.participants()) {
            state = state.with_party(connection.party_id().clone(), participant.clone())?;
        }

        let start_ms = now_ms();
        let progress = Progress::create(settings.deadline(), start_ms);
        state = state.init_phase(progress, start_ms);
        info!(parties = connections.len(), "MOPAC session starting");

        let mut session = MopacSession {
            state,
            connections,
            events: events_tx,
            timer: None,
            finished: false,
        };
        session.send_settings(&progress).await;
        session.start_phase().await;

        while !session.finished {
            let Some(event) = events_rx.recv().await else {
                session.end_negotiation().await;
                break;
            };
            session.handle(event).await;
        }
        if let Some(timer) = session.timer.take() {
            timer.abort();
        }

        Ok(session.state.result())
    }
}

/// One running MOPAC session: protocol state, connections and the
/// current phase timer.
struct MopacSession {
    state: MopacState,
    connections: Vec<Arc<dyn PartyConnection>>,
    events: mpsc::Sender<SessionEvent>,
    timer: Option<tokio::task::JoinHandle<()>>,
    finished: bool,
}

impl MopacSession {
    async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Action { party, action } => {
                debug!(%action, "action received");
                self.state = self.state.with_action(&party, action, now_ms());
                self.check_end_phase().await;
            }
            SessionEvent::Malformed { party, detail } => {
                warn!(%party, detail, "malformed action");
                self.state = self.state.with_exception(
                    ProtocolViolation::new(party, ViolationKind::MalformedAction)
                        .with_detail(detail),
                );
                self.check_end_phase().await;
            }
            SessionEvent::ConnectionLost { party, detail } => {
                warn!(%party, detail, "party connection lost");
                self.state = self.state.with_exception(
                    ProtocolViolation::new(party, ViolationKind::ConnectionFailure)
                        .with_detail(detail),
                );
                self.check_end_phase().await;
            }
            SessionEvent::DeadlineCheck => self.check_end_phase().await,
        }
    }

    /// Close the current phase when it is over; then either the whole
    /// session ends or the next phase opens.
    async fn check_end_phase(&mut self) {
        let now = now_ms();
        if !self.state.phase().is_final(now) {
            return;
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.state = self.state.finish_phase();
        if self.state.is_final(now) {
            self.end_negotiation().await;
            return;
        }
        self.state = self.state.next_phase(now);
        self.start_phase().await;
    }

    /// Announce the current phase to every active party and arm the
    /// phase timer.
    async fn start_phase(&mut self) {
        debug!(
            phase = self.state.phase().name(),
            deadline_ms = self.state.phase().deadline_ms(),
            "phase starting"
        );
        let inform = self.state.phase().inform();
        let active: Vec<PartyId> = self
            .state
            .phase()
            .states()
            .not_yet_acted()
            .iter()
            .cloned()
            .collect();
        for party in active {
            if let Err(e) = self.connection(&party).send(inform.clone()).await {
                self.state = self.state.with_exception(
                    ProtocolViolation::new(party, ViolationKind::ConnectionFailure)
                        .with_detail(e.to_string()),
                );
            }
        }

        let deadline_at = self.state.phase().deadline_ms() + 1;
        let events = self.events.clone();
        self.timer = Some(tokio::spawn(async move {
            let wait = deadline_at.saturating_sub(now_ms());
            tokio::time::sleep(Duration::from_millis(wait)).await;
            let _ = events.send(SessionEvent::DeadlineCheck).await;
        }));
    }

    async fn send_settings(&mut self, progress: &Progress) {
        for connection in &self.connections {
            let party = connection.party_id().clone();
            let Some(participant) = self.state.party_profiles().get(&party).cloned() else {
                continue;
            };
            let settings = Inform::Settings {
                party: party.clone(),
                profile: Box::new(participant.profile),
                protocol: "MOPAC".into(),
                progress: *progress,
                parameters: participant.parameters,
            };
            if let Err(e) = connection.send(settings).await {
                warn!(%party, error = %e, "failed to send settings");
            }
        }
    }

    /// Send the final result to everyone and close up. One-shot.
    async fn end_negotiation(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let agreements = self.state.agreements();
        info!(agreements = agreements.len(), "MOPAC session finished");
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
