// Domain layer - Sensor models, classification and derived views
pub mod error;
pub mod statistics;
pub mod status;
pub mod telemetry;
pub mod weather;
pub mod wind;
