//! CPU temperature detection.
//!
//! Sources are tried in a fixed order and the first one that produces at
//! least one valid reading wins. When nothing on the machine reports a
//! temperature a single synthetic reading is returned instead, so callers
//! always get a non-empty list.

use crate::core::system_info::types::{is_valid_temperature, TemperatureReading};
use crate::error::Result;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

/// Label carried by the synthetic reading
pub const MOCK_TEMPERATURE_LABEL: &str = "CPU Core (Mock)";
const MOCK_TEMP_BASE: f32 = 35.0;
const MOCK_TEMP_RANGE: f32 = 30.0;

/// Loose bounds for the first pass over platform sensor values
const SENSOR_PREFILTER_MIN: f32 = -50.0;
const SENSOR_PREFILTER_MAX: f32 = 200.0;

/// Accepted Kelvin band for WMI temperature probes
pub const KELVIN_MIN: f32 = 273.0;
pub const KELVIN_MAX: f32 = 423.0;
const KELVIN_OFFSET: f32 = 273.15;

/// Sensor group names that identify CPU temperature sensors
pub const SENSOR_GROUP_NAMES: &[&str] = &[
    "coretemp",
    "cpu_thermal",
    "k10temp",
    "acpi_thermal",
    "acpitz",
    "thermal_zone0",
    "cpu_0",
    "cpu_1",
    "cpu_2",
    "cpu_3",
    "cpu_4",
    "cpu_5",
    "cpu_6",
    "cpu_7",
    "cpu",
    "tctl",
    "tdie",
    "package",
    "core",
    "thermal",
    "hwmon",
    "sensors",
    "temperatures",
];

/// Words that mark an lm-sensors line as a temperature line
const LM_SENSORS_KEYWORDS: &[&str] = &["temp", "core", "cpu", "package", "tctl", "tdie"];

/// sysctl keys known to hold a CPU temperature
pub const SYSCTL_TEMPERATURE_KEYS: &[&str] = &["cpu_temp", "cpu.temperature", ".temperature"];

static LM_SENSORS_VALUE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\+(\d+(?:\.\d+)?)\s*°C").ok());

/// One place temperatures can come from.
pub trait TemperatureSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Raw readings. Validation happens in the detector.
    fn read(&self) -> Result<Vec<TemperatureReading>>;
}

/// Ordered fallback chain of temperature sources.
pub struct TemperatureDetector {
    sources: Vec<Box<dyn TemperatureSource>>,
}

impl TemperatureDetector {
    pub fn new(sources: Vec<Box<dyn TemperatureSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources, in evaluation order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Never empty. Falls back to a synthetic reading.
    pub fn detect(&self) -> Vec<TemperatureReading> {
        for source in &self.sources {
            match source.read() {
                Ok(readings) => {
                    let valid = retain_valid(readings);
                    if !valid.is_empty() {
                        debug!(
                            "Temperature source '{}' returned {} reading(s)",
                            source.name(),
                            valid.len()
                        );
                        return valid;
                    }
                    debug!("Temperature source '{}' returned nothing usable", source.name());
                }
                Err(e) => {
                    warn!("Temperature source '{}' failed: {}", source.name(), e);
                }
            }
        }

        vec![mock_temperature()]
    }
}

/// Drop readings outside the accepted Celsius range.
pub fn retain_valid(readings: Vec<TemperatureReading>) -> Vec<TemperatureReading> {
    readings
        .into_iter()
        .filter(|r| {
            let ok = r.is_valid();
            if !ok {
                debug!("Discarding out-of-range reading {} = {}", r.label, r.current);
            }
            ok
        })
        .collect()
}

/// Synthetic reading, uniformly drawn from `[35, 65)`.
pub fn mock_temperature() -> TemperatureReading {
    let value = MOCK_TEMP_BASE + rand::thread_rng().gen_range(0.0..MOCK_TEMP_RANGE);
    info!(
        "Using mock temperature data (no real sensors detected): {:.1}°C",
        value
    );
    TemperatureReading::new(MOCK_TEMPERATURE_LABEL, value)
}

pub fn is_mock(reading: &TemperatureReading) -> bool {
    reading.label == MOCK_TEMPERATURE_LABEL
}

/// Whether a platform sensor label belongs to a known CPU sensor group.
pub fn is_known_sensor_group(label: &str) -> bool {
    let label = label.to_lowercase();
    SENSOR_GROUP_NAMES.iter().any(|name| label.contains(name))
}

/// Filter named platform sensor values down to plausible CPU temperatures.
pub fn filter_sensor_group_values<I>(values: I) -> Vec<TemperatureReading>
where
    I: IntoIterator<Item = (String, Option<f32>)>,
{
    values
        .into_iter()
        .filter(|(label, _)| is_known_sensor_group(label))
        .filter_map(|(label, value)| {
            let value = value?;
            if value > SENSOR_PREFILTER_MIN && value < SENSOR_PREFILTER_MAX {
                Some(TemperatureReading::new(label, value))
            } else {
                None
            }
        })
        .filter(|r| is_valid_temperature(r.current))
        .collect()
}

/// Parse a thermal-zone `temp` file (milli-degrees Celsius).
pub fn parse_thermal_zone_value(raw: &str) -> Option<f32> {
    let millidegrees: i64 = raw.trim().parse().ok()?;
    Some(millidegrees as f32 / 1000.0)
}

/// Parse one `sensors` output line such as `Core 0:  +45.0°C  (high = +80.0°C)`.
///
/// The first `+`-prefixed number is the current value; later ones are limits.
pub fn parse_lm_sensors_line(line: &str) -> Option<TemperatureReading> {
    if !line.contains("°C") {
        return None;
    }

    let lower = line.to_lowercase();
    if !LM_SENSORS_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }

    let (label, rest) = line.split_once(':')?;
    let re = LM_SENSORS_VALUE.as_ref()?;
    let value: f32 = re.captures(rest)?.get(1)?.as_str().parse().ok()?;

    Some(TemperatureReading::new(label.trim(), value))
}

pub fn parse_lm_sensors_output(output: &str) -> Vec<TemperatureReading> {
    output.lines().filter_map(parse_lm_sensors_line).collect()
}

/// Parse a `sysctl` line such as `dev.cpu.0.temperature: 45.0C`.
pub fn parse_sysctl_line(line: &str) -> Option<TemperatureReading> {
    let (key, value) = line.rsplit_once(':')?;
    let key = key.trim();

    if !SYSCTL_TEMPERATURE_KEYS.iter().any(|k| key.contains(k)) {
        return None;
    }

    let value: f32 = value
        .trim()
        .trim_end_matches('C')
        .trim()
        .parse()
        .ok()?;

    Some(TemperatureReading::new(key, value))
}

pub fn parse_sysctl_output(output: &str) -> Vec<TemperatureReading> {
    output.lines().filter_map(parse_sysctl_line).collect()
}

/// Kelvin probe value to Celsius, `None` outside the 273–423 K band.
pub fn kelvin_to_celsius(kelvin: f32) -> Option<f32> {
    if (KELVIN_MIN..=KELVIN_MAX).contains(&kelvin) {
        Some(kelvin - KELVIN_OFFSET)
    } else {
        None
    }
}

/// Tenths of a Kelvin (ACPI thermal zones) to Celsius.
pub fn decikelvin_to_celsius(decikelvin: f32) -> f32 {
    decikelvin / 10.0 - KELVIN_OFFSET
}
