use crate::core::system_info::types::MemoryInfo;
use crate::error::{HostscopeError, Result};
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

pub fn collect() -> Result<MemoryInfo> {
    let refresh = RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram());
    let sys = System::new_with_specifics(refresh);

    let total = sys.total_memory();
    if total == 0 {
        return Err(HostscopeError::source_unavailable("memory size not reported"));
    }

    Ok(build(total, sys.available_memory(), sys.used_memory(), sys.free_memory()))
}

/// `percent` is the share of memory not available to new processes.
pub fn build(total: u64, available: u64, used: u64, free: u64) -> MemoryInfo {
    let percent = if total > 0 {
        (total.saturating_sub(available) as f32 / total as f32) * 100.0
    } else {
        0.0
    };

    MemoryInfo {
        total,
        available,
        percent,
        used,
        free,
    }
}
