// Ingestion service - Broker subscription lifecycle and message processing
use crate::application::backoff::Backoff;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::TelemetryError;
use crate::infrastructure::payload_decoder::decode_payload;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Subscribed,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Subscribed => "subscribed",
        }
    }
}

/// Pub/sub connection delivering raw telemetry payloads.
#[async_trait]
pub trait TelemetryTransport: Send {
    /// Connect with the configured identity and subscribe to the telemetry topic
    async fn connect(&mut self) -> Result<(), TelemetryError>;

    /// Wait for the next payload. An error means the connection is gone.
    async fn next_message(&mut self) -> Result<Bytes, TelemetryError>;

    /// Unsubscribe and close the connection, if one is open
    async fn disconnect(&mut self);
}

/// A payload stamped with the time it came off the transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub received_at: i64,
    pub payload: Bytes,
}

impl InboundMessage {
    pub fn received_now(payload: Bytes) -> Self {
        Self {
            received_at: Utc::now().timestamp(),
            payload,
        }
    }
}

enum SessionEnd {
    Disconnected,
    Shutdown,
}

/// Owns the transport and drives `Disconnected -> Connecting -> Subscribed`,
/// reconnecting with exponential backoff whenever a session ends.
pub struct IngestionController<T> {
    transport: T,
    backoff: Backoff,
    state: watch::Sender<ConnectionState>,
}

impl<T: TelemetryTransport> IngestionController<T> {
    pub fn new(transport: T, backoff: Backoff) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            backoff,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!(from = previous.label(), to = state.label(), "ingestion state changed");
        }
    }

    /// Runs until `shutdown` is cancelled or the message queue closes.
    pub async fn run(mut self, queue: mpsc::Sender<InboundMessage>, shutdown: CancellationToken) {
        loop {
            self.set_state(ConnectionState::Connecting);
            let connected = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.transport.connect() => result,
            };

            match connected {
                Ok(()) => {
                    self.backoff.reset();
                    self.set_state(ConnectionState::Subscribed);
                    tracing::info!("subscribed to telemetry topic");
                    if let SessionEnd::Shutdown = self.pump(&queue, &shutdown).await {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to connect to telemetry broker");
                }
            }

            self.set_state(ConnectionState::Disconnected);
            let delay = self.backoff.next_delay();
            tracing::info!(delay_secs = delay.as_secs(), "retrying broker connection after backoff");
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.transport.disconnect().await;
        self.set_state(ConnectionState::Disconnected);
        tracing::info!("ingestion controller stopped");
    }

    async fn pump(
        &mut self,
        queue: &mpsc::Sender<InboundMessage>,
        shutdown: &CancellationToken,
    ) -> SessionEnd {
        loop {
            let message = tokio::select! {
                _ = shutdown.cancelled() => return SessionEnd::Shutdown,
                message = self.transport.next_message() => message,
            };

            match message {
                Ok(payload) => match queue.try_send(InboundMessage::received_now(payload)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("telemetry queue full; dropping message");
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::warn!("message processor stopped; ending ingestion");
                        return SessionEnd::Shutdown;
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "telemetry connection lost");
                    return SessionEnd::Disconnected;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Stored,
    Malformed,
    StorageFailed,
}

/// Decodes queued payloads one at a time and upserts them.
#[derive(Clone)]
pub struct MessageProcessor {
    repository: Arc<dyn TelemetryRepository>,
}

impl MessageProcessor {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn run(self, mut queue: mpsc::Receiver<InboundMessage>) {
        while let Some(message) = queue.recv().await {
            self.process(&message.payload, message.received_at).await;
        }
        tracing::info!("message processor stopped");
    }

    /// Failures are logged and the message dropped; nothing is retried.
    pub async fn process(&self, payload: &[u8], received_at: i64) -> ProcessOutcome {
        let record = match decode_payload(payload, received_at) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, bytes = payload.len(), "dropping telemetry message");
                return ProcessOutcome::Malformed;
            }
        };

        match self.repository.upsert(&record).await {
            Ok(()) => {
                tracing::debug!(timestamp = record.timestamp, "stored sensor record");
                ProcessOutcome::Stored
            }
            Err(err) => {
                tracing::warn!(error = %err, timestamp = record.timestamp, "dropping sensor record");
                ProcessOutcome::StorageFailed
            }
        }
    }
}

pub struct IngestionHandle {
    pub state: watch::Receiver<ConnectionState>,
    controller: JoinHandle<()>,
    processor: JoinHandle<()>,
}

impl IngestionHandle {
    /// Waits for both tasks to finish after shutdown has been requested.
    pub async fn join(self) {
        if let Err(err) = self.controller.await {
            tracing::error!(error = %err, "ingestion controller task failed");
        }
        if let Err(err) = self.processor.await {
            tracing::error!(error = %err, "message processor task failed");
        }
    }
}

/// Spawns the controller and processor tasks, joined by a bounded queue.
pub fn spawn_ingestion<T>(
    transport: T,
    backoff: Backoff,
    repository: Arc<dyn TelemetryRepository>,
    queue_capacity: usize,
    shutdown: CancellationToken,
) -> IngestionHandle
where
    T: TelemetryTransport + 'static,
{
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));
    let controller = IngestionController::new(transport, backoff);
    let state = controller.state();

    let processor = tokio::spawn(MessageProcessor::new(repository).run(rx));
    let controller = tokio::spawn(controller.run(tx, shutdown));

    IngestionHandle {
        state,
        controller,
        processor,
    }
}
