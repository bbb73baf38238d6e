// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_response;
pub mod influx_repository;
pub mod json_mapper;
pub mod memory_repository;
pub mod mqtt_transport;
pub mod payload_decoder;
