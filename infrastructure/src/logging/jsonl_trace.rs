//! JSONL trace of one session's traffic

use async_trait::async_trait;
use parley_application::{
    ConnectError, ConnectionError, ConnectionFactory, PartyConnection, SessionEvent,
};
use parley_domain::{Inform, PartyId, PartyWithProfile};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::warn;

/// Wraps a connection factory so that all traffic of the sessions it
/// connects is appended to a JSONL trace file. Trace write failures are
/// logged and ignored; tracing never disturbs a running session.
pub struct TracingConnectionFactory<F> {
    inner: F,
    path: PathBuf,
}

impl<F> TracingConnectionFactory<F> {
    pub fn new(inner: F, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }
}

#[async_trait]
impl<F: ConnectionFactory> ConnectionFactory for TracingConnectionFactory<F> {
    async fn connect_all(
        &self,
        participants: &[PartyWithProfile],
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Vec<Arc<dyn PartyConnection>>, ConnectError> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ConnectError::Failed(format!("cannot open trace file: {e}")))?;
        let trace = Arc::new(TraceWriter {
            file: Mutex::new(file),
        });

        // tee party actions through the trace on their way to the session
        let (tee_tx, mut tee_rx) = mpsc::channel::<SessionEvent>(events.max_capacity());
        let forward_trace = Arc::clone(&trace);
        tokio::spawn(async move {
            while let Some(event) = tee_rx.recv().await {
                if let SessionEvent::Action { party, action } = &event {
                    forward_trace.record(Some(party), "action", serde_json::to_value(action).ok());
                }
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });

        let connections = self.inner.connect_all(participants, tee_tx).await?;
        Ok(connections
            .into_iter()
            .map(|inner| {
                Arc::new(TracingConnection {
                    inner,
                    trace: Arc::clone(&trace),
                }) as Arc<dyn PartyConnection>
            })
            .collect())
    }
}

struct TracingConnection {
    inner: Arc<dyn PartyConnection>,
    trace: Arc<TraceWriter>,
}

#[async_trait]
impl PartyConnection for TracingConnection {
    fn party_id(&self) -> &PartyId {
        self.inner.party_id()
    }

    async fn send(&self, inform: Inform) -> Result<(), ConnectionError> {
        self.trace.record(
            Some(self.inner.party_id()),
            "inform",
            serde_json::to_value(&inform).ok(),
        );
        self.inner.send(inform).await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

struct TraceWriter {
    file: Mutex<std::fs::File>,
}

impl TraceWriter {
    fn record(&self, party: Option<&PartyId>, direction: &str, payload: Option<serde_json::Value>) {
        let line = serde_json::json!({
            "ts": chrono::Utc::now().to_rfc3339(),
            "party": party.map(|p| p.name()),
            "direction": direction,
            "payload": payload,
        });
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(file, "{line}") {
            warn!(error = %e, "failed to write session trace");
        }
    }
}
