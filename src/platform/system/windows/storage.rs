use super::core::{lenient_u64, wmi_connection, wmi_query};
use crate::core::system_info::types::DiskInfo;
use crate::error::Result;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32LogicalDisk {
    #[serde(rename = "DeviceID")]
    device_id: String,
    file_system: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    free_space: Option<u64>,
}

/// Fixed local disks (`DriveType = 3`) as reported by WMI.
pub fn fixed_logical_disks() -> Result<Vec<DiskInfo>> {
    let wmi = wmi_connection()?;
    let disks: Vec<Win32LogicalDisk> = wmi_query(
        &wmi,
        "SELECT DeviceID, FileSystem, Size, FreeSpace FROM Win32_LogicalDisk WHERE DriveType = 3",
    )?;

    Ok(disks
        .into_iter()
        .filter_map(|d| {
            let total = d.size.filter(|s| *s > 0)?;
            let mountpoint = format!("{}\\", d.device_id);
            Some(DiskInfo::from_usage(
                d.device_id,
                mountpoint,
                d.file_system.unwrap_or_else(|| "unknown".to_string()),
                total,
                d.free_space.unwrap_or(0),
            ))
        })
        .collect())
}
