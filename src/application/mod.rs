// Application layer - Use cases over the repository and broker ports
pub mod backoff;
pub mod ingestion_service;
pub mod telemetry_repository;
pub mod weather_service;
