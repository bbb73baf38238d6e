use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub influx: Option<InfluxSettings>,
    pub mqtt: MqttSettings,
    #[serde(default)]
    pub ingestion: IngestionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Fixed offset of the station's local time; no DST lookup
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl ServerSettings {
    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .with_context(|| format!("invalid utc_offset_hours: {}", self.utc_offset_hours))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Influx,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
}

impl InfluxSettings {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    pub topic: String,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestionSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backoff_base_secs: default_backoff_base_secs(),
            backoff_max_secs: default_backoff_max_secs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl IngestionSettings {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs.max(1))
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_secs(self.backoff_max_secs.max(1))
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_utc_offset_hours() -> i32 {
    -3
}

fn default_measurement() -> String {
    "sensor_data".to_string()
}

fn default_write_timeout_secs() -> u64 {
    10
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "weather-ingest".to_string()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_backoff_base_secs() -> u64 {
    5
}

fn default_backoff_max_secs() -> u64 {
    300
}

fn default_queue_capacity() -> usize {
    64
}

/// Loads `config/weather.toml` (optional), then `WEATHER__SECTION__KEY`
/// environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/weather").required(false))
        .add_source(
            config::Environment::with_prefix("WEATHER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.utc_offset()?;
        if self.storage.backend == StorageBackend::Influx && self.influx.is_none() {
            anyhow::bail!("storage backend is influx but no [influx] section is configured");
        }
        if self.ingestion.backoff_base_secs > self.ingestion.backoff_max_secs {
            anyhow::bail!(
                "ingestion.backoff_base_secs ({}) exceeds backoff_max_secs ({})",
                self.ingestion.backoff_base_secs,
                self.ingestion.backoff_max_secs
            );
        }
        Ok(())
    }
}
