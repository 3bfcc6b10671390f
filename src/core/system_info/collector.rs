use crate::core::system_info::core_types;
use crate::core::system_info::geolocation::GeoResolver;
use crate::core::system_info::gpu::VendorGpuMemorySource;
use crate::core::system_info::hardware::{collect_hardware_info, HardwareInventorySource};
use crate::core::system_info::io_offset::IoCounterOffsetStore;
use crate::core::system_info::network::{ConnectionSource, InterfaceSource, IoCounterSource};
use crate::core::system_info::processor::build_processor_info;
use crate::core::system_info::temperature::TemperatureDetector;
use crate::core::system_info::types::*;
use crate::core::system_info::{cpu, memory, network, os, storage};
use crate::error::{HostscopeError, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Instant;

/// Everything the HTTP layer polls. Each call is a fresh, blocking read.
pub trait SystemProbe: Send + Sync {
    /// Processor identity from the hardware inventory
    fn processor(&self) -> Result<ProcessorInfo>;
    fn cpu(&self) -> Result<CpuInfo>;
    fn memory(&self) -> Result<MemoryInfo>;
    fn disks(&self) -> Result<Vec<DiskInfo>>;
    /// Offset-adjusted counters, interface addresses and public IP
    fn network(&self) -> Result<NetworkInfo>;
    fn platform(&self) -> Result<PlatformInfo>;
    fn hardware_info(&self) -> HardwareInfo;
    /// Raw cumulative counters, no offset applied
    fn live_io_counters(&self) -> Result<IoCounters>;
}

fn timed<T>(section: &str, f: impl FnOnce() -> Result<T>) -> Option<T> {
    let start = Instant::now();
    let result = f();
    debug!("{} took {:.3}s", section, start.elapsed().as_secs_f64());

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to collect {} info: {}", section, e);
            None
        }
    }
}

/// Poll every section; failed sections are left out of the document.
pub fn collect_system_info(probe: &dyn SystemProbe) -> Result<SystemInfoResponse> {
    let processor = timed("hardware", || probe.processor());

    let cpu = timed("cpu", || probe.cpu()).map(|mut cpu| {
        if let Some(p) = &processor {
            cpu.core_types = Some(core_types::classify(
                cpu.cpu_count_physical,
                cpu.cpu_count_logical,
                Some(&p.name),
                Some(&p.manufacturer),
            ));
        }
        cpu
    });

    let response = SystemInfoResponse {
        cpu,
        memory: timed("memory", || probe.memory()),
        disk: timed("disk", || probe.disks()),
        network: timed("network", || probe.network()),
        platform: timed("platform", || probe.platform()),
    };

    if response.is_empty() {
        return Err(HostscopeError::AllSubsystemsFailed);
    }
    Ok(response)
}

/// Probe backed by the real OS and hardware sources.
pub struct LiveSystemProbe {
    detector: TemperatureDetector,
    inventory: Arc<dyn HardwareInventorySource>,
    vendor_gpu: Arc<dyn VendorGpuMemorySource>,
    counters: Arc<dyn IoCounterSource>,
    interfaces: Arc<dyn InterfaceSource>,
    connections: Arc<dyn ConnectionSource>,
    offsets: Arc<IoCounterOffsetStore>,
    geo: Arc<GeoResolver>,
}

impl LiveSystemProbe {
    pub fn new(
        detector: TemperatureDetector,
        inventory: Arc<dyn HardwareInventorySource>,
        vendor_gpu: Arc<dyn VendorGpuMemorySource>,
        counters: Arc<dyn IoCounterSource>,
        interfaces: Arc<dyn InterfaceSource>,
        connections: Arc<dyn ConnectionSource>,
        offsets: Arc<IoCounterOffsetStore>,
        geo: Arc<GeoResolver>,
    ) -> Self {
        Self {
            detector,
            inventory,
            vendor_gpu,
            counters,
            interfaces,
            connections,
            offsets,
            geo,
        }
    }
}

impl SystemProbe for LiveSystemProbe {
    fn processor(&self) -> Result<ProcessorInfo> {
        let record = self.inventory.processor()?.ok_or_else(|| {
            HostscopeError::source_unavailable(format!("{}: no processor record", self.inventory.name()))
        })?;

        Ok(build_processor_info(
            &record.name,
            &record.manufacturer,
            record.cores,
            record.logical_processors,
        ))
    }

    fn cpu(&self) -> Result<CpuInfo> {
        cpu::collect(&self.detector)
    }

    fn memory(&self) -> Result<MemoryInfo> {
        memory::collect()
    }

    fn disks(&self) -> Result<Vec<DiskInfo>> {
        storage::collect()
    }

    fn network(&self) -> Result<NetworkInfo> {
        network::collect(
            self.counters.as_ref(),
            self.interfaces.as_ref(),
            self.connections.as_ref(),
            &self.offsets,
            &self.geo,
        )
    }

    fn platform(&self) -> Result<PlatformInfo> {
        os::collect()
    }

    fn hardware_info(&self) -> HardwareInfo {
        collect_hardware_info(self.inventory.as_ref(), self.vendor_gpu.as_ref())
    }

    fn live_io_counters(&self) -> Result<IoCounters> {
        self.counters.io_counters()
    }
}
