use crate::core::system_info::types::DiskInfo;
use crate::error::{HostscopeError, Result};
use crate::platform::fs::fallback_volumes;
use log::{debug, warn};
use std::io;
use sysinfo::Disks;

pub fn collect() -> Result<Vec<DiskInfo>> {
    let disks = Disks::new_with_refreshed_list();

    let candidates: Vec<DiskInfo> = disks
        .list()
        .iter()
        .map(|disk| {
            DiskInfo::from_usage(
                disk.name().to_string_lossy().to_string(),
                disk.mount_point().to_string_lossy().to_string(),
                disk.file_system().to_string_lossy().to_string(),
                disk.total_space(),
                disk.available_space(),
            )
        })
        .collect();

    let volumes = retain_accessible(candidates, |mount| std::fs::metadata(mount).map(|_| ()));
    if !volumes.is_empty() {
        return Ok(volumes);
    }

    warn!("No usable volumes from the disk list, probing fallback locations");
    let volumes = fallback_volumes();
    if volumes.is_empty() {
        return Err(HostscopeError::subsystem("no usable disk volumes"));
    }
    Ok(volumes)
}

/// Drop volumes whose mount point is gone or not readable by us.
pub fn retain_accessible<F>(candidates: Vec<DiskInfo>, check: F) -> Vec<DiskInfo>
where
    F: Fn(&str) -> io::Result<()>,
{
    candidates
        .into_iter()
        .filter(|disk| match check(&disk.mountpoint) {
            Ok(()) => true,
            Err(e) if matches!(e.kind(), io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound) => {
                debug!("Skipping volume {}: {}", disk.mountpoint, e);
                false
            }
            Err(e) => {
                debug!("Metadata lookup on {} failed, keeping it: {}", disk.mountpoint, e);
                true
            }
        })
        .collect()
}
