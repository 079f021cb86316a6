pub mod configuration;
pub mod domain;
pub mod telemetry;
pub mod tester_client;
