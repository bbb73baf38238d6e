// Mapper from domain views to the JSON contexts served to dashboards
use crate::domain::statistics::Summary;
use crate::domain::weather::{AggregateWindow, CurrentConditions};
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";
const NO_DIRECTION: &str = "N/D";

/// Flat current-conditions payload. Field names are part of the public API
/// consumed by existing dashboards and must not change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiContext {
    pub timestamp: Option<i64>,
    pub temperature: f64,
    pub temperature_status: String,
    pub humidity: f64,
    pub humidity_status: String,
    pub rain_level: f64,
    pub rain_status: String,
    pub uv_index: f64,
    pub uv_status: String,
    pub solar_radiation: f64,
    pub wind_speed_kmh: f64,
    pub wind_speed_status: String,
    pub wind_direction: String,
    pub wind_icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummaries {
    pub temperature: Summary,
    pub humidity: Summary,
    pub rain_level: Summary,
    pub wind_speed: Summary,
}

/// Chart data for the local day; wind speed is in km/h.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardContext {
    pub timestamps: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub rain_level: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub summary: DashboardSummaries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureContext {
    pub timestamps: Vec<String>,
    pub temperatures: Vec<f64>,
    pub last_temperature: f64,
    pub average_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
}

pub fn prepare_api_context(conditions: Option<&CurrentConditions>) -> ApiContext {
    let Some(conditions) = conditions else {
        return ApiContext {
            timestamp: None,
            temperature: 0.0,
            temperature_status: NOT_AVAILABLE.to_string(),
            humidity: 0.0,
            humidity_status: NOT_AVAILABLE.to_string(),
            rain_level: 0.0,
            rain_status: NOT_AVAILABLE.to_string(),
            uv_index: 0.0,
            uv_status: NOT_AVAILABLE.to_string(),
            solar_radiation: 0.0,
            wind_speed_kmh: 0.0,
            wind_speed_status: NOT_AVAILABLE.to_string(),
            wind_direction: NO_DIRECTION.to_string(),
            wind_icon: "rotate-0".to_string(),
        };
    };

    ApiContext {
        timestamp: Some(conditions.timestamp),
        temperature: conditions.temperature,
        temperature_status: conditions.temperature_status.to_string(),
        humidity: conditions.humidity,
        humidity_status: conditions.humidity_status.to_string(),
        rain_level: conditions.rain_level,
        rain_status: conditions
            .rain_status
            .map(|status| status.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        uv_index: conditions.uv_index,
        uv_status: conditions.uv_status.to_string(),
        solar_radiation: conditions.solar_radiation,
        wind_speed_kmh: conditions.wind_speed_kmh,
        wind_speed_status: conditions.wind_speed_status.to_string(),
        wind_direction: conditions.wind_direction.name().to_string(),
        wind_icon: conditions.wind_direction.icon(),
    }
}

pub fn prepare_dashboard_context(window: &AggregateWindow) -> DashboardContext {
    DashboardContext {
        timestamps: window.timestamps.clone(),
        temperature: window.temperature.values(),
        humidity: window.humidity.values(),
        rain_level: window.rain_level.values(),
        wind_speed: window.wind_speed_kmh.values(),
        summary: DashboardSummaries {
            temperature: window.temperature.summary,
            humidity: window.humidity.summary,
            rain_level: window.rain_level.summary,
            wind_speed: window.wind_speed_kmh.summary,
        },
    }
}

/// `None` when the window holds no measured temperature at all.
pub fn prepare_temperature_context(window: &AggregateWindow) -> Option<TemperatureContext> {
    let series = &window.temperature;
    let last_temperature = series.latest?;

    Some(TemperatureContext {
        timestamps: series.points.iter().map(|point| point.time.clone()).collect(),
        temperatures: series.values(),
        last_temperature,
        average_temperature: series.summary.average,
        max_temperature: series.summary.max,
        min_temperature: series.summary.min,
    })
}
