// Telemetry collection and configuration

pub mod config;
pub mod system_info;

pub use config::Config;
