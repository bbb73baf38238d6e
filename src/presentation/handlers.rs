// HTTP request handlers
use crate::domain::weather::WindowReport;
use crate::infrastructure::http_response::ApiError;
use crate::infrastructure::json_mapper::{
    prepare_api_context, prepare_dashboard_context, prepare_temperature_context, ApiContext,
    DashboardContext, TemperatureContext,
};
use crate::presentation::app_state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Health check endpoint, reporting the broker session state
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let ingestion = *state.ingestion_state.borrow();
    Json(json!({ "status": "ok", "ingestion": ingestion }))
}

/// Current conditions. Answers with "N/A" statuses rather than 404 when
/// nothing has been stored yet.
pub async fn current_conditions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiContext>, ApiError> {
    let conditions = state.weather_service.current_conditions().await?;
    Ok(Json(prepare_api_context(conditions.as_ref())))
}

/// Chart series and summaries for the current local day
pub async fn daily_readings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardContext>, ApiError> {
    let report = state.weather_service.daily_report(Utc::now()).await?;
    let window = report.window();
    match report {
        WindowReport::NoData(_) => {
            tracing::debug!(start = window.start, end = window.end, "no readings for today");
            Err(ApiError::NotFound("no data available for today"))
        }
        WindowReport::Data(aggregate) => Ok(Json(prepare_dashboard_context(&aggregate))),
    }
}

pub async fn temperature(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemperatureContext>, ApiError> {
    let report = state.weather_service.daily_report(Utc::now()).await?;
    let WindowReport::Data(window) = report else {
        return Err(ApiError::NotFound("no temperature data available"));
    };
    prepare_temperature_context(&window)
        .map(Json)
        .ok_or(ApiError::NotFound("no temperature data available"))
}

#[cfg(test)]
mod tests {
    use crate::application::ingestion_service::ConnectionState;
    use crate::application::telemetry_repository::TelemetryRepository;
    use crate::application::weather_service::WeatherService;
    use crate::domain::telemetry::{SensorRecord, StoredReading};
    use crate::infrastructure::memory_repository::MemoryRepository;
    use crate::presentation::app_state::AppState;
    use crate::presentation::build_router;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{FixedOffset, Utc};
    use serde_json::Value;
    use std::sync::Arc;
    use tokio::sync::watch;
    use tower::ServiceExt;

    fn router(repository: Arc<MemoryRepository>) -> (axum::Router, watch::Sender<ConnectionState>) {
        let (tx, rx) = watch::channel(ConnectionState::Disconnected);
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let state = AppState {
            weather_service: WeatherService::new(repository, offset),
            ingestion_state: rx,
        };
        (build_router(state), tx)
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_ingestion_state() {
        let (router, tx) = router(Arc::new(MemoryRepository::new()));
        tx.send_replace(ConnectionState::Subscribed);

        let (status, body) = get(router, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ingestion"], "subscribed");
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repository = Arc::new(MemoryRepository::new());

        let (status, body) = get(router(repository.clone()).0, "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["temperature_status"], "N/A");
        assert_eq!(body["wind_direction"], "N/D");

        let (status, body) = get(router(repository.clone()).0, "/api/readings").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = get(router(repository).0, "/api/temperature").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_readings_for_today() {
        let repository = Arc::new(MemoryRepository::new());
        let now = Utc::now().timestamp();
        repository
            .upsert(&SensorRecord {
                temperature: 22.0,
                rain_level: 3.0,
                average_wind_speed: 5.0,
                ..SensorRecord::new(now - 1)
            })
            .await
            .unwrap();
        repository
            .upsert(&SensorRecord {
                temperature: 23.0,
                rain_level: 3.0,
                ..SensorRecord::new(now)
            })
            .await
            .unwrap();

        let (status, body) = get(router(repository.clone()).0, "/api").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["temperature"], 23.0);
        assert_eq!(body["rain_status"], "not-raining");
        assert_eq!(body["wind_speed_status"], "calm");
        assert_eq!(body["timestamp"], now);

        // both rows may straddle local midnight, so only the latest is certain
        let (status, body) = get(router(repository.clone()).0, "/api/temperature").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_temperature"], 23.0);

        let (status, body) = get(router(repository).0, "/api/readings").await;
        assert_eq!(status, StatusCode::OK);
        let timestamps = body["timestamps"].as_array().unwrap();
        assert!(!timestamps.is_empty());
        assert_eq!(timestamps.len(), body["temperature"].as_array().unwrap().len());
    }

    #[tokio::test]
    async fn test_temperature_absent_from_every_row_is_not_found() {
        let repository = Arc::new(MemoryRepository::new());
        let mut reading = StoredReading::empty(Utc::now().timestamp());
        reading.humidity = Some(40.0);
        repository.insert_reading(reading).await;

        let (status, _) = get(router(repository.clone()).0, "/api/temperature").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(router(repository).0, "/api/readings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["humidity"]["average"], 40.0);
    }
}
