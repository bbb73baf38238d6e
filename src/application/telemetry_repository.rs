// Repository trait for sensor telemetry storage
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{SensorRecord, StoredReading};
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Insert the record, or overwrite every field of the row already stored
    /// at `record.timestamp`
    async fn upsert(&self, record: &SensorRecord) -> Result<(), TelemetryError>;

    /// Rows with `start <= timestamp < end`, ascending by timestamp
    async fn query_range(&self, start: i64, end: i64) -> Result<Vec<StoredReading>, TelemetryError>;

    /// The `limit` most recent rows, descending by timestamp
    async fn query_latest(&self, limit: usize) -> Result<Vec<StoredReading>, TelemetryError>;
}
