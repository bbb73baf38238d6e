// Decoder for the weather station's tag/value telemetry payload
use crate::domain::error::TelemetryError;
use crate::domain::telemetry::{SensorField, SensorRecord};
use serde_json::{Map, Value};

/// Decodes a payload such as `[{"n":"emw_temperature","v":21.4}, ...]`.
///
/// The decoder is forgiving:
/// - unknown tags are ignored
/// - tags that never appear stay at `0.0`
/// - an entry whose name is not a string or whose value is not a number is
///   skipped on its own
/// - a tag repeated in the payload takes its last value
///
/// Only a payload that is not a JSON array of objects is rejected. The record
/// is stamped with `received_at`, never with a time sent by the publisher.
pub fn decode_payload(payload: &[u8], received_at: i64) -> Result<SensorRecord, TelemetryError> {
    let entries: Vec<Map<String, Value>> = serde_json::from_slice(payload)?;

    let mut record = SensorRecord::new(received_at);
    for entry in &entries {
        let Some(field) = entry
            .get("n")
            .and_then(Value::as_str)
            .and_then(SensorField::from_tag)
        else {
            continue;
        };

        match entry.get("v").and_then(Value::as_f64) {
            Some(value) => record.set(field, value),
            None => tracing::debug!(tag = field.column(), "skipping non-numeric telemetry value"),
        }
    }

    Ok(record)
}
