// Error taxonomy shared by the ingestion and read paths
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Broker connect, subscribe or delivery failure
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed telemetry payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("failed to write sensor record: {0:#}")]
    StorageWrite(anyhow::Error),

    #[error("failed to read sensor records: {0:#}")]
    StorageRead(anyhow::Error),
}

impl TelemetryError {
    pub fn transport(message: impl std::fmt::Display) -> Self {
        TelemetryError::Transport(message.to_string())
    }
}
