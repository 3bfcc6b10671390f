// Linux procfs / sysfs adapters

pub mod connections;
pub mod inventory;

pub use connections::ProcNetConnections;
pub use inventory::SysfsInventory;
