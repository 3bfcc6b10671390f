use crate::core::system_info::gpu::{VendorGpuMemory, VendorGpuMemorySource};
use crate::error::{HostscopeError, Result};

#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;
#[cfg(feature = "nvml")]
use once_cell::sync::Lazy;

/// NVML must be initialized once per process.
#[cfg(feature = "nvml")]
static NVML: Lazy<Option<Nvml>> = Lazy::new(|| match Nvml::init() {
    Ok(nvml) => Some(nvml),
    Err(e) => {
        log::debug!("NVML not available: {}", e);
        None
    }
});

/// GPU memory sizes from the NVIDIA Management Library.
pub struct NvmlMemorySource;

#[cfg(feature = "nvml")]
impl VendorGpuMemorySource for NvmlMemorySource {
    fn devices(&self) -> Result<Vec<VendorGpuMemory>> {
        let nvml = NVML.as_ref().ok_or_else(|| {
            HostscopeError::source_unavailable(
                "NVML not available (NVIDIA driver not installed or incompatible)",
            )
        })?;

        let count = nvml
            .device_count()
            .map_err(|e| HostscopeError::subsystem(format!("NVML device count failed: {}", e)))?;

        let mut devices = Vec::new();
        for index in 0..count {
            let device = match nvml.device_by_index(index) {
                Ok(device) => device,
                Err(e) => {
                    log::warn!("Failed to get NVIDIA device {}: {}", index, e);
                    continue;
                }
            };

            let (name, memory) = match (device.name(), device.memory_info()) {
                (Ok(name), Ok(memory)) => (name, memory),
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("Skipping NVIDIA device {}: {}", index, e);
                    continue;
                }
            };

            devices.push(VendorGpuMemory {
                index,
                name,
                total_bytes: memory.total,
                used_bytes: memory.used,
                free_bytes: memory.free,
            });
        }

        Ok(devices)
    }
}

#[cfg(not(feature = "nvml"))]
impl VendorGpuMemorySource for NvmlMemorySource {
    fn devices(&self) -> Result<Vec<VendorGpuMemory>> {
        Err(HostscopeError::source_unavailable(
            "NVIDIA GPU support not enabled",
        ))
    }
}
