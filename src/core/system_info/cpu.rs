use crate::core::system_info::temperature::TemperatureDetector;
use crate::core::system_info::types::{CpuFrequency, CpuInfo};
use crate::error::{HostscopeError, Result};
use std::path::Path;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Window over which per-core usage is measured
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[cfg(target_os = "linux")]
const CPUFREQ_DIR: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

pub fn collect(detector: &TemperatureDetector) -> Result<CpuInfo> {
    collect_with_interval(detector, CPU_SAMPLE_INTERVAL)
}

pub fn collect_with_interval(detector: &TemperatureDetector, interval: Duration) -> Result<CpuInfo> {
    let refresh = RefreshKind::nothing().with_cpu(CpuRefreshKind::everything());
    let mut sys = System::new_with_specifics(refresh);

    // Usage is a delta between two refreshes
    sys.refresh_cpu_all();
    std::thread::sleep(interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
    sys.refresh_cpu_all();

    let cpus = sys.cpus();
    if cpus.is_empty() {
        return Err(HostscopeError::source_unavailable("no CPUs reported"));
    }

    let logical = cpus.len() as u32;
    let physical = System::physical_core_count()
        .map(|n| n as u32)
        .unwrap_or(logical);

    let (min, max) = frequency_bounds();
    let cpu_freq = Some(CpuFrequency {
        current: cpus[0].frequency() as f64,
        min,
        max,
    });

    Ok(CpuInfo {
        cpu_count_physical: physical,
        cpu_count_logical: logical,
        cpu_percent: cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
        cpu_freq,
        temperatures: detector.detect(),
        core_types: None,
    })
}

/// cpufreq files hold kHz
pub fn parse_khz_as_mhz(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|khz| *khz > 0)
        .map(|khz| khz as f64 / 1000.0)
}

pub fn read_frequency_bounds(cpufreq_dir: &Path) -> (Option<f64>, Option<f64>) {
    let read = |file: &str| {
        std::fs::read_to_string(cpufreq_dir.join(file))
            .ok()
            .and_then(|raw| parse_khz_as_mhz(&raw))
    };
    (read("cpuinfo_min_freq"), read("cpuinfo_max_freq"))
}

#[cfg(target_os = "linux")]
fn frequency_bounds() -> (Option<f64>, Option<f64>) {
    read_frequency_bounds(Path::new(CPUFREQ_DIR))
}

#[cfg(not(target_os = "linux"))]
fn frequency_bounds() -> (Option<f64>, Option<f64>) {
    (None, None)
}
