// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::backoff::Backoff;
use crate::application::ingestion_service::{spawn_ingestion, ConnectionState};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::application::weather_service::WeatherService;
use crate::infrastructure::config::{load_app_config, AppConfig, StorageBackend};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::memory_repository::MemoryRepository;
use crate::infrastructure::mqtt_transport::MqttTransport;
use crate::presentation::app_state::AppState;
use crate::presentation::build_router;

fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn TelemetryRepository>> {
    match config.storage.backend {
        StorageBackend::Influx => {
            let influx = config
                .influx
                .clone()
                .context("missing [influx] configuration")?;
            let write_timeout = influx.write_timeout();
            Ok(Arc::new(InfluxRepository::new(
                influx.host,
                influx.token,
                influx.database,
                influx.retention_policy,
                influx.measurement,
                write_timeout,
            )))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; readings are lost on restart");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,weather_telemetry=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = load_app_config()?;
    let offset = config.server.utc_offset()?;

    // Create repository (infrastructure layer)
    let repository = build_repository(&config)?;

    // Start ingestion (application layer)
    let shutdown = CancellationToken::new();
    let (ingestion, ingestion_state) = if config.ingestion.enabled {
        let handle = spawn_ingestion(
            MqttTransport::new(config.mqtt.clone()),
            Backoff::new(config.ingestion.backoff_base(), config.ingestion.backoff_max()),
            repository.clone(),
            config.ingestion.queue_capacity,
            shutdown.clone(),
        );
        let state = handle.state.clone();
        (Some(handle), state)
    } else {
        tracing::info!("ingestion disabled; serving stored readings only");
        let (_, state) = watch::channel(ConnectionState::Disconnected);
        (None, state)
    };

    // Create application state
    let state = AppState {
        weather_service: WeatherService::new(repository, offset),
        ingestion_state,
    };

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind_address))?;
    tracing::info!(%addr, "starting weather-telemetry service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown requested");
            server_shutdown.cancel();
        })
        .await?;

    // The server can also stop on its own; make sure ingestion follows.
    shutdown.cancel();
    if let Some(handle) = ingestion {
        handle.join().await;
    }

    tracing::info!("weather-telemetry service stopped");
    Ok(())
}
