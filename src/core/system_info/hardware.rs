//! Hardware inventory: processor, display adapters, baseboard and Wi-Fi
//! adapters, read through a platform management interface.

use crate::core::system_info::gpu::{memory_map, resolve_adapter_ram, VendorGpuMemorySource};
use crate::core::system_info::processor::build_processor_info;
use crate::core::system_info::types::{GpuInfo, HardwareInfo, MotherboardInfo, WifiAdapterInfo};
use crate::error::Result;
use log::{debug, warn};

/// Link speeds at or above this are treated as bogus readings
pub const WIFI_SPEED_MAX: u64 = 10_000_000;

pub const WIFI_KEYWORDS: &[&str] = &[
    "WIFI", "WI-FI", "WIRELESS", "802.11", "WLAN", "AX", "BE", "AC", "BROADCOM", "ATHEROS",
    "REALTEK", "INTEL", "QUALCOMM", "MEDIATEK", "RALINK",
];

pub const ETHERNET_KEYWORDS: &[&str] = &["ETHERNET", "GBE", "PCIE GBE", "LAN", "ETHERNET CONTROLLER"];

/// Raw processor record from the inventory provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorRecord {
    pub name: String,
    pub manufacturer: String,
    pub cores: u32,
    pub logical_processors: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoControllerRecord {
    pub name: String,
    pub driver_version: Option<String>,
    pub status: Option<String>,
    pub adapter_ram: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseboardRecord {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkAdapterRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub device_id: Option<String>,
    pub mac_address: Option<String>,
    pub speed: Option<u64>,
    pub physical: bool,
    pub enabled: bool,
    pub status: Option<String>,
    /// Set when the provider knows the link type; `None` falls back to
    /// matching the adapter name
    pub wireless: Option<bool>,
}

impl NetworkAdapterRecord {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.description.as_deref())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// Platform management interface (WMI, sysfs, ...).
pub trait HardwareInventorySource: Send + Sync {
    fn name(&self) -> &'static str;
    fn processor(&self) -> Result<Option<ProcessorRecord>>;
    fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>>;
    fn baseboard(&self) -> Result<Option<BaseboardRecord>>;
    fn network_adapters(&self) -> Result<Vec<NetworkAdapterRecord>>;
}

/// Physical, enabled, wireless, with a MAC.
///
/// Without a provider flag an adapter counts as wireless when its name has
/// a Wi-Fi keyword and no Ethernet keyword.
pub fn is_physical_wifi_adapter(adapter: &NetworkAdapterRecord) -> bool {
    if !(adapter.physical && adapter.enabled) {
        return false;
    }

    let has_mac = adapter
        .mac_address
        .as_deref()
        .map_or(false, |m| !m.trim().is_empty());

    let is_wifi = adapter.wireless.unwrap_or_else(|| {
        let name = adapter.display_name().to_uppercase();
        let is_ethernet = ETHERNET_KEYWORDS.iter().any(|k| name.contains(k));
        WIFI_KEYWORDS.iter().any(|k| name.contains(k)) && !is_ethernet
    });

    is_wifi && has_mac
}

pub fn wifi_adapter_info(adapter: &NetworkAdapterRecord) -> WifiAdapterInfo {
    WifiAdapterInfo {
        name: adapter.display_name(),
        manufacturer: adapter.manufacturer.clone(),
        device_id: adapter.device_id.clone(),
        mac_address: adapter.mac_address.clone(),
        speed: adapter.speed.filter(|s| *s > 0 && *s < WIFI_SPEED_MAX),
        status: adapter.status.clone(),
    }
}

/// Assemble the inventory document. Each part fails on its own.
pub fn collect_hardware_info(
    inventory: &dyn HardwareInventorySource,
    vendor_gpu: &dyn VendorGpuMemorySource,
) -> HardwareInfo {
    let mut info = HardwareInfo::default();

    match inventory.processor() {
        Ok(Some(p)) => {
            info.processor = Some(build_processor_info(
                &p.name,
                &p.manufacturer,
                p.cores,
                p.logical_processors,
            ))
        }
        Ok(None) => debug!("{}: no processor record", inventory.name()),
        Err(e) => warn!("{}: processor query failed: {}", inventory.name(), e),
    }

    match inventory.video_controllers() {
        Ok(controllers) => {
            let gpus: Vec<GpuInfo> = controllers
                .into_iter()
                .map(|c| GpuInfo {
                    name: c.name,
                    driver_version: c.driver_version,
                    status: c.status,
                    adapter_ram: c.adapter_ram,
                })
                .collect();

            let vendor_memory = match vendor_gpu.devices() {
                Ok(devices) => memory_map(&devices),
                Err(e) => {
                    debug!("Vendor GPU memory unavailable: {}", e);
                    Vec::new()
                }
            };

            info.gpu = resolve_adapter_ram(gpus, &vendor_memory);
        }
        Err(e) => warn!("{}: video controller query failed: {}", inventory.name(), e),
    }

    match inventory.baseboard() {
        Ok(Some(b)) => {
            info.motherboard = Some(MotherboardInfo {
                manufacturer: b.manufacturer,
                product: b.product,
                serial_number: b.serial_number,
            })
        }
        Ok(None) => debug!("{}: no baseboard record", inventory.name()),
        Err(e) => warn!("{}: baseboard query failed: {}", inventory.name(), e),
    }

    match inventory.network_adapters() {
        Ok(adapters) => {
            info.wifi_adapters = adapters
                .iter()
                .filter(|a| is_physical_wifi_adapter(a))
                .map(wifi_adapter_info)
                .collect();
        }
        Err(e) => warn!("{}: network adapter query failed: {}", inventory.name(), e),
    }

    info
}
