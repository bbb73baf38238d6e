// Weather service - Daily aggregation and current conditions
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::TelemetryError;
use crate::domain::status::ms_to_kmh;
use crate::domain::telemetry::{SensorField, StoredReading};
use crate::domain::weather::{
    AggregateWindow, CurrentConditions, SeriesWindow, TimeWindow, WindowReport,
};
use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use std::sync::Arc;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone)]
pub struct WeatherService {
    repository: Arc<dyn TelemetryRepository>,
    offset: FixedOffset,
}

impl WeatherService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, offset: FixedOffset) -> Self {
        Self { repository, offset }
    }

    /// Local calendar day containing `reference`, as `[midnight, next midnight)`.
    pub fn day_window(&self, reference: DateTime<Utc>) -> TimeWindow {
        let local_midnight = reference
            .with_timezone(&self.offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let start = local_midnight.and_utc().timestamp() - i64::from(self.offset.local_minus_utc());
        TimeWindow::new(start, start + SECONDS_PER_DAY)
    }

    /// Local wall-clock `HH:MM` for an epoch timestamp
    pub fn local_time_label(&self, timestamp: i64) -> String {
        DateTime::from_timestamp(timestamp, 0)
            .map(|utc| utc.with_timezone(&self.offset).format("%H:%M").to_string())
            .unwrap_or_default()
    }

    /// Aggregates the local day around `reference`.
    ///
    /// A day without any stored row is reported as `WindowReport::NoData`,
    /// never as a window of zeros. Storage failures are returned to the
    /// caller.
    pub async fn daily_report(&self, reference: DateTime<Utc>) -> Result<WindowReport, TelemetryError> {
        let window = self.day_window(reference);
        let readings = self.repository.query_range(window.start, window.end).await?;

        tracing::debug!(
            start = window.start,
            end = window.end,
            rows = readings.len(),
            "aggregating daily window"
        );

        if readings.is_empty() {
            return Ok(WindowReport::NoData(window));
        }
        Ok(WindowReport::Data(self.aggregate(window, &readings)))
    }

    fn aggregate(&self, window: TimeWindow, readings: &[StoredReading]) -> AggregateWindow {
        let timestamps: Vec<String> = readings
            .iter()
            .map(|reading| self.local_time_label(reading.timestamp))
            .collect();

        AggregateWindow {
            window,
            temperature: series_of(&timestamps, readings, |r| r.get(SensorField::Temperature)),
            humidity: series_of(&timestamps, readings, |r| r.get(SensorField::Humidity)),
            rain_level: series_of(&timestamps, readings, |r| r.get(SensorField::RainLevel)),
            wind_speed_kmh: series_of(&timestamps, readings, |r| {
                r.get(SensorField::AverageWindSpeed).map(ms_to_kmh)
            }),
            timestamps,
        }
    }

    /// The most recent reading and the one immediately before it.
    pub async fn latest_readings(
        &self,
    ) -> Result<(Option<StoredReading>, Option<StoredReading>), TelemetryError> {
        let mut latest = self.repository.query_latest(2).await?.into_iter();
        Ok((latest.next(), latest.next()))
    }

    pub async fn current_conditions(&self) -> Result<Option<CurrentConditions>, TelemetryError> {
        let (current, previous) = self.latest_readings().await?;
        Ok(current.map(|current| CurrentConditions::derive(&current, previous.as_ref())))
    }
}

fn series_of(
    timestamps: &[String],
    readings: &[StoredReading],
    value: impl Fn(&StoredReading) -> Option<f64>,
) -> SeriesWindow {
    SeriesWindow::new(
        timestamps
            .iter()
            .cloned()
            .zip(readings.iter().map(value))
            .collect(),
    )
}
