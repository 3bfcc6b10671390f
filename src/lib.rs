// Hostscope library - public API

pub mod error;
pub use error::{HostscopeError, Result};

pub mod api;
pub mod core;
pub mod platform;

pub use core::config::Config;

/// Initialize logging. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}
