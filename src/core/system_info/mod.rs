pub mod collector;
pub mod core_types;
pub mod cpu;
pub mod geolocation;
pub mod gpu;
pub mod hardware;
pub mod io_offset;
pub mod memory;
pub mod network;
pub mod os;
pub mod processor;
pub mod storage;
pub mod temperature;
pub mod types;

pub use collector::{collect_system_info, LiveSystemProbe, SystemProbe};
pub use geolocation::GeoResolver;
pub use io_offset::IoCounterOffsetStore;
pub use temperature::TemperatureDetector;
pub use types::*;
