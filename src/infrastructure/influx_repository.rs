// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{SensorField, SensorRecord, StoredReading};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Rows live in one measurement with no tags, so a point's timestamp is its
/// key: writing a point at an existing timestamp replaces the fields it
/// carries, and every write carries all of them.
#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    write_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
        write_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
            write_timeout,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&epoch=s&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_write_url(&self) -> String {
        format!(
            "{}/write?db={}&rp={}&precision=s",
            self.host, self.database, self.retention_policy
        )
    }

    fn select_fields(&self) -> String {
        let fields: Vec<String> = SensorField::ALL
            .iter()
            .map(|field| format!("\"{}\"", field.column()))
            .collect();
        format!("SELECT {} FROM \"{}\"", fields.join(", "), self.measurement)
    }

    fn range_query(&self, start: i64, end: i64) -> String {
        format!(
            "{} WHERE time >= {}s AND time < {}s ORDER BY time ASC",
            self.select_fields(),
            start,
            end
        )
    }

    fn latest_query(&self, limit: usize) -> String {
        format!("{} ORDER BY time DESC LIMIT {}", self.select_fields(), limit)
    }

    /// Serialize a record as one line-protocol point with second precision
    fn to_line_protocol(&self, record: &SensorRecord) -> Result<String> {
        let mut fields = Vec::with_capacity(SensorField::ALL.len());
        for field in SensorField::ALL {
            let value = record.get(field);
            if !value.is_finite() {
                anyhow::bail!("field {} has non-finite value {}", field.column(), value);
            }
            fields.push(format!("{}={}", field.column(), value));
        }

        Ok(format!(
            "{} {} {}",
            escape_measurement(&self.measurement),
            fields.join(","),
            record.timestamp
        ))
    }

    /// A write that outlives `write_timeout` fails instead of stalling the
    /// message processor.
    async fn write_line(&self, line: String) -> Result<()> {
        let response = self
            .client
            .post(self.build_write_url())
            .timeout(self.write_timeout)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await
            .context("Failed to send write to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB write failed with status {}: {}", status, body);
        }

        Ok(())
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    async fn query_readings(&self, query: &str) -> Result<Vec<StoredReading>> {
        tracing::debug!("Executing sensor query: {}", query);
        let response = self.execute_query(query).await?;
        Ok(parse_readings(&response))
    }
}

fn escape_measurement(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

/// Values may come back as numbers or numeric strings; anything else, and
/// explicit nulls, are absent.
fn parse_value(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn parse_readings(response: &InfluxQLResponse) -> Vec<StoredReading> {
    let mut readings = Vec::new();
    let Some(series_list) = response.results.first().and_then(|r| r.series.as_ref()) else {
        return readings;
    };

    for series in series_list {
        let Some(time_idx) = series.columns.iter().position(|c| c == "time") else {
            tracing::warn!("InfluxDB series without a time column");
            continue;
        };
        let field_columns: Vec<(usize, SensorField)> = series
            .columns
            .iter()
            .enumerate()
            .filter_map(|(idx, column)| SensorField::from_column(column).map(|f| (idx, f)))
            .collect();

        for row in &series.values {
            let Some(timestamp) = row.get(time_idx).and_then(|v| v.as_i64()) else {
                tracing::debug!("Skipping InfluxDB row without an epoch timestamp");
                continue;
            };

            let mut reading = StoredReading::empty(timestamp);
            for (idx, field) in &field_columns {
                reading.set(*field, row.get(*idx).and_then(parse_value));
            }
            readings.push(reading);
        }
    }

    readings
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn upsert(&self, record: &SensorRecord) -> Result<(), TelemetryError> {
        let line = self
            .to_line_protocol(record)
            .map_err(TelemetryError::StorageWrite)?;
        self.write_line(line)
            .await
            .map_err(TelemetryError::StorageWrite)
    }

    async fn query_range(&self, start: i64, end: i64) -> Result<Vec<StoredReading>, TelemetryError> {
        if start >= end {
            return Ok(Vec::new());
        }
        self.query_readings(&self.range_query(start, end))
            .await
            .map_err(TelemetryError::StorageRead)
    }

    async fn query_latest(&self, limit: usize) -> Result<Vec<StoredReading>, TelemetryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_readings(&self.latest_query(limit))
            .await
            .map_err(TelemetryError::StorageRead)
    }
}
