pub mod config;
pub mod error;
pub mod lettings;
pub mod telemetry;
