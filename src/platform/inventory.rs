use crate::core::system_info::hardware::HardwareInventorySource;
use std::sync::Arc;

#[cfg(any(test, not(any(windows, target_os = "linux"))))]
pub use unsupported::NoInventory;

#[cfg(any(test, not(any(windows, target_os = "linux"))))]
mod unsupported {
    use crate::core::system_info::hardware::{
        BaseboardRecord, HardwareInventorySource, NetworkAdapterRecord, ProcessorRecord,
        VideoControllerRecord,
    };
    use crate::error::{HostscopeError, Result};

    /// Stand-in for platforms without a management interface.
    pub struct NoInventory;

    fn unavailable<T>() -> Result<T> {
        Err(HostscopeError::source_unavailable(
            "hardware inventory is not supported on this platform",
        ))
    }

    impl HardwareInventorySource for NoInventory {
        fn name(&self) -> &'static str {
            "none"
        }

        fn processor(&self) -> Result<Option<ProcessorRecord>> {
            unavailable()
        }

        fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>> {
            unavailable()
        }

        fn baseboard(&self) -> Result<Option<BaseboardRecord>> {
            unavailable()
        }

        fn network_adapters(&self) -> Result<Vec<NetworkAdapterRecord>> {
            unavailable()
        }
    }
}

pub fn default_inventory() -> Arc<dyn HardwareInventorySource> {
    #[cfg(windows)]
    {
        Arc::new(crate::platform::system::windows::WmiInventory)
    }

    #[cfg(target_os = "linux")]
    {
        Arc::new(crate::platform::system::linux::SysfsInventory::default())
    }

    #[cfg(not(any(windows, target_os = "linux")))]
    {
        Arc::new(NoInventory)
    }
}
