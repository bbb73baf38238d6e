// Application state for HTTP handlers
use crate::application::ingestion_service::ConnectionState;
use crate::application::weather_service::WeatherService;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub weather_service: WeatherService,
    pub ingestion_state: watch::Receiver<ConnectionState>,
}
