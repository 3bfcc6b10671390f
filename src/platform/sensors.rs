//! Temperature sources and the per-platform fallback chain.

use crate::core::config::Config;
use crate::core::system_info::temperature::{
    filter_sensor_group_values, parse_lm_sensors_output, parse_sysctl_output,
    parse_thermal_zone_value, TemperatureDetector, TemperatureSource,
};
use crate::core::system_info::types::TemperatureReading;
use crate::error::{HostscopeError, Result};
use crate::platform::command::run_command;
use std::fs;
use std::path::PathBuf;
use sysinfo::Components;

/// Hardware sensor groups as enumerated by sysinfo.
pub struct ComponentsSource;

impl TemperatureSource for ComponentsSource {
    fn name(&self) -> &'static str {
        "sensor groups"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        let components = Components::new_with_refreshed_list();
        Ok(filter_sensor_group_values(
            components
                .list()
                .iter()
                .map(|c| (c.label().to_string(), c.temperature())),
        ))
    }
}

/// `thermal_zone*/temp` files under a thermal root.
pub struct ThermalZoneSource {
    root: PathBuf,
}

impl ThermalZoneSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl TemperatureSource for ThermalZoneSource {
    fn name(&self) -> &'static str {
        "thermal zones"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        if !self.root.is_dir() {
            return Err(HostscopeError::source_unavailable(format!(
                "{} does not exist",
                self.root.display()
            )));
        }

        let mut zones: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("thermal_zone"))
            .map(|entry| entry.path())
            .collect();
        zones.sort();

        let mut readings = Vec::new();
        for zone in zones {
            let raw = match fs::read_to_string(zone.join("temp")) {
                Ok(raw) => raw,
                Err(e) => {
                    log::debug!("Skipping {}: {}", zone.display(), e);
                    continue;
                }
            };

            let Some(value) = parse_thermal_zone_value(&raw) else {
                log::debug!("Unparseable value in {}: {:?}", zone.display(), raw.trim());
                continue;
            };

            let label = fs::read_to_string(zone.join("type"))
                .map(|t| t.trim().to_string())
                .ok()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| {
                    zone.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });

            readings.push(TemperatureReading::new(label, value));
        }

        Ok(readings)
    }
}

/// lm-sensors `sensors` command output.
pub struct LmSensorsSource;

impl TemperatureSource for LmSensorsSource {
    fn name(&self) -> &'static str {
        "lm-sensors"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        Ok(parse_lm_sensors_output(&run_command("sensors", &[])?))
    }
}

/// `sysctl -a` on macOS and the BSDs.
pub struct SysctlSource;

impl TemperatureSource for SysctlSource {
    fn name(&self) -> &'static str {
        "sysctl"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        Ok(parse_sysctl_output(&run_command("sysctl", &["-a"])?))
    }
}

/// Ordered source chain for the current platform.
pub fn default_temperature_sources(config: &Config) -> Vec<Box<dyn TemperatureSource>> {
    let mut sources: Vec<Box<dyn TemperatureSource>> = vec![Box::new(ComponentsSource)];

    if cfg!(target_os = "linux") {
        sources.push(Box::new(ThermalZoneSource::new(config.thermal_root.clone())));
    }

    sources.push(Box::new(LmSensorsSource));

    #[cfg(windows)]
    {
        use crate::platform::system::windows::thermal::{WmiThermalZoneSource, WmiTemperatureProbeSource};
        sources.push(Box::new(WmiTemperatureProbeSource));
        sources.push(Box::new(WmiThermalZoneSource));
    }

    if cfg!(any(
        target_os = "macos",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd"
    )) {
        sources.push(Box::new(SysctlSource));
    }

    sources
}

pub fn default_temperature_detector(config: &Config) -> TemperatureDetector {
    let detector = TemperatureDetector::new(default_temperature_sources(config));
    log::debug!("Temperature sources: {:?}", detector.source_names());
    detector
}
