//! In-process party connections

use crate::parties::NegotiationParty;
use async_trait::async_trait;
use parley_application::{
    ConnectError, ConnectionError, ConnectionFactory, PartyConnection, SessionEvent,
};
use parley_domain::{Inform, PartyId, PartyWithProfile};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Capacity of each party's inform inbox
const INBOX_SIZE: usize = 16;

type PartyBuilder =
    Box<dyn Fn(&PartyWithProfile) -> Box<dyn NegotiationParty> + Send + Sync>;

/// Maps `party_ref` strings from the session settings to party
/// implementations.
#[derive(Default)]
pub struct PartyRegistry {
    builders: BTreeMap<String, PartyBuilder>,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a party implementation under a reference name
    pub fn register(
        mut self,
        name: impl Into<String>,
        builder: impl Fn(&PartyWithProfile) -> Box<dyn NegotiationParty> + Send + Sync + 'static,
    ) -> Self {
        self.builders.insert(name.into(), Box::new(builder));
        self
    }

    /// The built-in parties: `conceder` and `random`
    pub fn builtin() -> Self {
        Self::new()
            .register("conceder", |pwp| {
                Box::new(crate::parties::ConcederParty::new(pwp.parameters.clone()))
            })
            .register("random", |pwp| {
                Box::new(crate::parties::RandomParty::new(pwp.parameters.clone()))
            })
    }

    fn build(&self, reference: &str, pwp: &PartyWithProfile) -> Option<Box<dyn NegotiationParty>> {
        self.builders.get(reference).map(|b| b(pwp))
    }
}

/// Connects in-process parties from a [`PartyRegistry`].
pub struct InProcessConnectionFactory {
    registry: PartyRegistry,
}

impl InProcessConnectionFactory {
    pub fn new(registry: PartyRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ConnectionFactory for InProcessConnectionFactory {
    async fn connect_all(
        &self,
        participants: &[PartyWithProfile],
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Vec<Arc<dyn PartyConnection>>, ConnectError> {
        let mut connections: Vec<Arc<dyn PartyConnection>> = Vec::new();
        for (index, participant) in participants.iter().enumerate() {
            let party_id = PartyId::new(format!("party{}", index + 1))
                .expect("generated party ids are valid");
            let party = self
                .registry
                .build(&participant.party_ref, participant)
                .ok_or_else(|| {
                    ConnectError::Failed(format!("unknown party ref '{}'", participant.party_ref))
                })?;
            let (inform_tx, inform_rx) = mpsc::channel(INBOX_SIZE);
            tokio::spawn(party_loop(
                party,
                party_id.clone(),
                inform_rx,
                events.clone(),
            ));
            connections.push(Arc::new(InProcessConnection {
                party_id,
                inform_tx,
            }));
        }
        Ok(connections)
    }
}

/// One party's task: consume informs, emit the party's actions.
async fn party_loop(
    mut party: Box<dyn NegotiationParty>,
    party_id: PartyId,
    mut inbox: mpsc::Receiver<Inform>,
    events: mpsc::Sender<SessionEvent>,
) {
    while let Some(inform) = inbox.recv().await {
        let last = matches!(inform, Inform::Finished { .. });
        for action in party.notify(&inform) {
            let sent = events
                .send(SessionEvent::Action {
                    party: party_id.clone(),
                    action,
                })
                .await;
            if sent.is_err() {
                // session is gone; nothing left to do
                return;
            }
        }
        if last {
            break;
        }
    }
    debug!(%party_id, "party task stopped");
}

struct InProcessConnection {
    party_id: PartyId,
    inform_tx: mpsc::Sender<Inform>,
}

#[async_trait]
impl PartyConnection for InProcessConnection {
    fn party_id(&self) -> &PartyId {
        &self.party_id
    }

    async fn send(&self, inform: Inform) -> Result<(), ConnectionError> {
        self.inform_tx
            .send(inform)
            .await
            .map_err(|_| ConnectionError::Disconnected(self.party_id.to_string()))
    }

    async fn close(&self) {
        // the party task ends itself after Finished; dropping the
        // session drops the inbox sender for anything that lingers
    }
}
