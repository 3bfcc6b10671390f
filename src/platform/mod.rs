// Platform-specific data sources

pub mod command;
pub mod fs;
pub mod inventory;
pub mod net;
pub mod nvidia_nvml;
pub mod sensors;
pub mod system;

pub use inventory::default_inventory;
pub use net::{default_connections, SysinfoNetworks};
pub use nvidia_nvml::NvmlMemorySource;
pub use sensors::default_temperature_detector;
