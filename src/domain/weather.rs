// Derived weather views: daily windows and current conditions
use super::statistics::Summary;
use super::status::{
    ms_to_kmh, HumidityStatus, RainStatus, TemperatureStatus, UvStatus, WindSpeedStatus,
};
use super::telemetry::{SensorField, StoredReading};
use super::wind::WindDirection;

/// Half-open interval of epoch seconds, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowPoint {
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    /// Zero when the reading was missing
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesWindow {
    pub points: Vec<WindowPoint>,
    pub summary: Summary,
    /// Most recent measured value in the window
    pub latest: Option<f64>,
}

impl SeriesWindow {
    pub fn new(points: Vec<(String, Option<f64>)>) -> Self {
        let summary = Summary::of_readings(points.iter().map(|(_, value)| *value));
        let latest = points.iter().rev().find_map(|(_, value)| *value);
        let points = points
            .into_iter()
            .map(|(time, value)| WindowPoint {
                time,
                value: value.unwrap_or(0.0),
            })
            .collect();
        Self {
            points,
            summary,
            latest,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateWindow {
    pub window: TimeWindow,
    pub timestamps: Vec<String>,
    pub temperature: SeriesWindow,
    pub humidity: SeriesWindow,
    pub rain_level: SeriesWindow,
    pub wind_speed_kmh: SeriesWindow,
}

/// Outcome of aggregating a window: either data, or an explicit empty state.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowReport {
    NoData(TimeWindow),
    Data(AggregateWindow),
}

impl WindowReport {
    pub fn window(&self) -> TimeWindow {
        match self {
            WindowReport::NoData(window) => *window,
            WindowReport::Data(aggregate) => aggregate.window,
        }
    }
}

/// Latest reading with every status derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub timestamp: i64,
    pub temperature: f64,
    pub temperature_status: TemperatureStatus,
    pub humidity: f64,
    pub humidity_status: HumidityStatus,
    pub rain_level: f64,
    /// Requires the preceding reading; `None` when there is only one
    pub rain_status: Option<RainStatus>,
    pub uv_index: f64,
    pub uv_status: UvStatus,
    pub solar_radiation: f64,
    pub wind_speed_kmh: f64,
    pub wind_speed_status: WindSpeedStatus,
    pub wind_direction: WindDirection,
}

impl CurrentConditions {
    pub fn derive(current: &StoredReading, previous: Option<&StoredReading>) -> Self {
        let temperature = current.value_or_zero(SensorField::Temperature);
        let humidity = current.value_or_zero(SensorField::Humidity);
        let rain_level = current.value_or_zero(SensorField::RainLevel);
        let uv_index = current.value_or_zero(SensorField::UvIndex);
        let wind_speed_kmh = ms_to_kmh(current.value_or_zero(SensorField::AverageWindSpeed));
        let rain_status = previous.map(|previous| {
            RainStatus::classify(rain_level, previous.value_or_zero(SensorField::RainLevel))
        });

        Self {
            timestamp: current.timestamp,
            temperature,
            temperature_status: TemperatureStatus::classify(temperature),
            humidity,
            humidity_status: HumidityStatus::classify(humidity),
            rain_level,
            rain_status,
            uv_index,
            uv_status: UvStatus::classify(uv_index),
            solar_radiation: current.value_or_zero(SensorField::SolarRadiation),
            wind_speed_kmh,
            wind_speed_status: WindSpeedStatus::classify(wind_speed_kmh),
            wind_direction: WindDirection::from_radians(
                current.value_or_zero(SensorField::WindDirection),
            ),
        }
    }
}
