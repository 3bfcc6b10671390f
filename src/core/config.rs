use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for the telemetry server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// How long a geolocation lookup stays valid
    pub cache_duration_secs: u64,
    /// Per-request timeout for outbound geolocation calls
    pub request_timeout_secs: u64,
    /// Attempts per geolocation service
    pub max_retries: u32,
    /// Root of the kernel thermal-zone tree (Linux)
    pub thermal_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
            cache_duration_secs: 300,
            request_timeout_secs: 5,
            max_retries: 2,
            thermal_root: PathBuf::from("/sys/class/thermal"),
        }
    }
}

impl Config {
    /// Load from the default config file. Environment overrides are
    /// applied separately with [`Config::apply_env`].
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit file. A missing or empty file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// `HOSTSCOPE_HOST`, `HOSTSCOPE_PORT` and `HOSTSCOPE_LOG` win over the file.
    ///
    /// Returns a message for every override that was ignored. Logging may
    /// not be set up yet, so reporting is left to the caller.
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut ignored = Vec::new();

        if let Some(host) = lookup("HOSTSCOPE_HOST") {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }

        if let Some(port) = lookup("HOSTSCOPE_PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(e) => ignored.push(format!("Ignoring invalid HOSTSCOPE_PORT '{}': {}", port, e)),
            }
        }

        if let Some(level) = lookup("HOSTSCOPE_LOG") {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }

        ignored
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hostscope").join("config.json"))
    }
}
