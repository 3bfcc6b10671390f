use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Lowest accepted temperature in °C
pub const MIN_TEMP_CELSIUS: f32 = 0.0;
/// Highest accepted temperature in °C
pub const MAX_TEMP_CELSIUS: f32 = 150.0;

/// A single temperature probe value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub label: String,
    pub current: f32,
}

impl TemperatureReading {
    pub fn new<S: Into<String>>(label: S, current: f32) -> Self {
        Self {
            label: label.into(),
            current,
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_temperature(self.current)
    }
}

pub fn is_valid_temperature(celsius: f32) -> bool {
    (MIN_TEMP_CELSIUS..=MAX_TEMP_CELSIUS).contains(&celsius)
}

/// Performance / efficiency core split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreTypeResult {
    pub p_cores: u32,
    pub e_cores: u32,
    pub total_cores: u32,
}

impl CoreTypeResult {
    /// Everything counted as efficiency cores
    pub fn fallback(total: u32) -> Self {
        Self {
            p_cores: 0,
            e_cores: total,
            total_cores: total,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.p_cores.checked_add(self.e_cores) == Some(self.total_cores)
    }
}

/// Processor identity as shown to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorInfo {
    pub name: String,
    pub manufacturer: String,
    pub cores: u32,
    pub logical_processors: u32,
    pub generation: Option<String>,
    pub codename: String,
}

/// Display adapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuInfo {
    pub name: String,
    pub driver_version: Option<String>,
    pub status: Option<String>,
    /// Dedicated memory in bytes
    pub adapter_ram: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotherboardInfo {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WifiAdapterInfo {
    pub name: String,
    pub manufacturer: Option<String>,
    pub device_id: Option<String>,
    pub mac_address: Option<String>,
    /// Link speed in bits per second
    pub speed: Option<u64>,
    pub status: Option<String>,
}

/// Hardware inventory document. Missing records serialize as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HardwareInfo {
    #[serde(serialize_with = "some_or_empty_object")]
    pub processor: Option<ProcessorInfo>,
    pub gpu: Vec<GpuInfo>,
    #[serde(serialize_with = "some_or_empty_object")]
    pub motherboard: Option<MotherboardInfo>,
    pub wifi_adapters: Vec<WifiAdapterInfo>,
}

fn some_or_empty_object<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => BTreeMap::<String, String>::new().serialize(serializer),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpSource {
    Remote,
    Local,
}

/// Public address and coarse location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpInfo {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub source: IpSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ipv6: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpInfo {
    pub fn remote<S: Into<String>>(ip: S, country: S, region: S, city: S) -> Self {
        Self {
            ip: ip.into(),
            country: country.into(),
            region: region.into(),
            city: city.into(),
            source: IpSource::Remote,
            local_ipv4: None,
            local_ipv6: None,
            ipv6: None,
            error: None,
        }
    }
}

/// Cumulative network counters, summed over interfaces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IoCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
}

impl IoCounters {
    /// Field-wise `self - other`, never below zero
    pub fn saturating_sub(&self, other: &IoCounters) -> IoCounters {
        IoCounters {
            bytes_sent: self.bytes_sent.saturating_sub(other.bytes_sent),
            bytes_recv: self.bytes_recv.saturating_sub(other.bytes_recv),
            packets_sent: self.packets_sent.saturating_sub(other.packets_sent),
            packets_recv: self.packets_recv.saturating_sub(other.packets_recv),
            errin: self.errin.saturating_sub(other.errin),
            errout: self.errout.saturating_sub(other.errout),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuFrequency {
    pub current: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub cpu_count_physical: u32,
    pub cpu_count_logical: u32,
    pub cpu_percent: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_freq: Option<CpuFrequency>,
    pub temperatures: Vec<TemperatureReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_types: Option<CoreTypeResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub percent: f32,
    pub used: u64,
    pub free: u64,
}

/// One mounted volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f32,
}

impl DiskInfo {
    pub fn from_usage(device: String, mountpoint: String, fstype: String, total: u64, free: u64) -> Self {
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            (used as f32 / total as f32) * 100.0
        } else {
            0.0
        };

        Self {
            device,
            mountpoint,
            fstype,
            total,
            used,
            free,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceAddressInfo {
    #[serde(rename = "type")]
    pub family: String,
    pub address: String,
}

/// An established TCP connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    /// `ip:port`
    pub local_address: String,
    /// `ip:port`, empty when there is no peer
    pub remote_address: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub io_counters: IoCounters,
    pub interfaces: BTreeMap<String, Vec<InterfaceAddressInfo>>,
    pub connections: Vec<ConnectionInfo>,
    pub ip_info: IpInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformInfo {
    pub system: String,
    pub release: String,
    pub version: String,
    pub architecture: String,
    pub processor: String,
}

/// `/api/system-info` document. Failed sections are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemInfoResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<Vec<DiskInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformInfo>,
}

impl SystemInfoResponse {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none()
            && self.memory.is_none()
            && self.disk.is_none()
            && self.network.is_none()
            && self.platform.is_none()
    }
}
