// In-process repository keeping rows in timestamp order
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{SensorRecord, StoredReading};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Writers serialize on the table lock; readers share it.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    rows: RwLock<BTreeMap<i64, StoredReading>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row as-is, including absent fields the decoder never produces.
    #[cfg(test)]
    pub async fn insert_reading(&self, reading: StoredReading) {
        self.rows.write().await.insert(reading.timestamp, reading);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl TelemetryRepository for MemoryRepository {
    async fn upsert(&self, record: &SensorRecord) -> Result<(), TelemetryError> {
        let row = StoredReading::from(*record);
        self.rows.write().await.insert(row.timestamp, row);
        Ok(())
    }

    async fn query_range(&self, start: i64, end: i64) -> Result<Vec<StoredReading>, TelemetryError> {
        if start >= end {
            return Ok(Vec::new());
        }
        let rows = self.rows.read().await;
        Ok(rows.range(start..end).map(|(_, row)| *row).collect())
    }

    async fn query_latest(&self, limit: usize) -> Result<Vec<StoredReading>, TelemetryError> {
        let rows = self.rows.read().await;
        Ok(rows.values().rev().take(limit).copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::SensorField;
    use std::sync::Arc;

    fn record(timestamp: i64, temperature: f64) -> SensorRecord {
        SensorRecord {
            temperature,
            ..SensorRecord::new(timestamp)
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repository = MemoryRepository::new();
        let sample = record(100, 21.0);

        repository.upsert(&sample).await.unwrap();
        let once = repository.query_range(0, 1_000).await.unwrap();
        repository.upsert(&sample).await.unwrap();
        let twice = repository.query_range(0, 1_000).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_timestamp_overwrites_all_fields() {
        let repository = MemoryRepository::new();
        repository
            .upsert(&SensorRecord {
                humidity: 80.0,
                ..record(100, 21.0)
            })
            .await
            .unwrap();
        repository.upsert(&record(100, 25.0)).await.unwrap();

        let rows = repository.query_latest(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temperature, Some(25.0));
        assert_eq!(rows[0].humidity, Some(0.0));
    }

    #[tokio::test]
    async fn test_range_is_half_open_and_ascending() {
        let repository = MemoryRepository::new();
        for ts in [30, 10, 20, 40] {
            repository.upsert(&record(ts, ts as f64)).await.unwrap();
        }

        let rows = repository.query_range(10, 40).await.unwrap();
        let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        assert!(repository.query_range(40, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_is_descending() {
        let repository = MemoryRepository::new();
        for ts in 1..=5 {
            repository.upsert(&record(ts, 0.0)).await.unwrap();
        }

        let rows = repository.query_latest(2).await.unwrap();
        let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![5, 4]);
        assert!(repository.query_latest(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absent_fields_stay_absent() {
        let repository = MemoryRepository::new();
        repository.insert_reading(StoredReading::empty(5)).await;
        let rows = repository.query_latest(1).await.unwrap();
        assert_eq!(rows[0].temperature, None);
    }

    #[tokio::test]
    async fn test_upsert_stores_every_field() {
        let repository = MemoryRepository::new();
        repository.upsert(&SensorRecord::new(5)).await.unwrap();
        let row = repository.query_latest(1).await.unwrap()[0];
        for field in SensorField::ALL {
            assert_eq!(row.get(field), Some(0.0), "{}", field.column());
        }
    }

    #[tokio::test]
    async fn test_concurrent_upserts_of_same_timestamp_leave_one_row() {
        let repository = Arc::new(MemoryRepository::new());
        let mut tasks = Vec::new();
        for i in 0..16 {
            let repository = repository.clone();
            tasks.push(tokio::spawn(async move {
                repository.upsert(&record(500, i as f64)).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let rows = repository.query_range(0, 1_000).await.unwrap();
        assert_eq!(rows.len(), 1);
        let temperature = rows[0].temperature.unwrap();
        assert!((0.0..16.0).contains(&temperature));
    }
}
