//! Back-fill of display-adapter memory sizes.
//!
//! The hardware inventory often reports no memory (or a truncated 32-bit
//! value) for discrete NVIDIA cards. NVML knows the real size but names the
//! cards differently, so the two lists are joined by a loose name match.

use crate::core::system_info::types::GpuInfo;
use crate::error::Result;
use serde::Serialize;

/// Name fragments that mark an inventory entry as an NVIDIA card
pub const NVIDIA_MARKERS: &[&str] = &["NVIDIA", "GEFORCE", "QUADRO", "RTX", "TESLA"];

/// Product-line markers that count as a match on their own
const SHARED_LINE_MARKERS: &[&str] = &["GEFORCE", "RTX"];

/// Minimum token length for the word-overlap match
const MIN_TOKEN_LEN: usize = 4;

/// One device as seen by the vendor memory library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorGpuMemory {
    pub index: u32,
    pub name: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

/// Vendor library that can enumerate GPUs with their memory sizes.
pub trait VendorGpuMemorySource: Send + Sync {
    fn devices(&self) -> Result<Vec<VendorGpuMemory>>;
}

/// Ordered `(device name, total bytes)` pairs; earlier entries win.
pub fn memory_map(devices: &[VendorGpuMemory]) -> Vec<(String, u64)> {
    devices
        .iter()
        .map(|d| (d.name.clone(), d.total_bytes))
        .collect()
}

pub fn is_nvidia_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    NVIDIA_MARKERS.iter().any(|m| upper.contains(m))
}

/// Find the vendor-reported memory size for an inventory GPU name.
pub fn match_vendor_memory(gpu_name: &str, vendor_memory: &[(String, u64)]) -> Option<u64> {
    let gpu_upper = gpu_name.to_uppercase();

    vendor_memory.iter().find_map(|(vendor_name, bytes)| {
        let vendor_upper = vendor_name.to_uppercase();

        let shared_marker = SHARED_LINE_MARKERS
            .iter()
            .any(|m| gpu_upper.contains(m) && vendor_upper.contains(m));

        let shared_token = vendor_upper
            .split_whitespace()
            .filter(|token| token.len() >= MIN_TOKEN_LEN)
            .any(|token| gpu_upper.contains(token));

        (shared_marker || shared_token).then_some(*bytes)
    })
}

/// Fill missing adapter memory from the vendor list.
pub fn resolve_adapter_ram(gpus: Vec<GpuInfo>, vendor_memory: &[(String, u64)]) -> Vec<GpuInfo> {
    if vendor_memory.is_empty() {
        return gpus;
    }

    gpus.into_iter()
        .map(|mut gpu| {
            let missing = gpu.adapter_ram.map_or(true, |ram| ram == 0);
            if missing && is_nvidia_name(&gpu.name) {
                if let Some(bytes) = match_vendor_memory(&gpu.name, vendor_memory) {
                    log::debug!("Filled adapter RAM for '{}' from NVML: {} bytes", gpu.name, bytes);
                    gpu.adapter_ram = Some(bytes);
                }
            }
            gpu
        })
        .collect()
}
