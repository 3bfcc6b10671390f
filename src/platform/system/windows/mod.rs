// Windows management-interface adapters

pub mod core;
pub mod inventory;
pub mod storage;
pub mod thermal;

pub use inventory::WmiInventory;
