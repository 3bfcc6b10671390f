// Volume probing used when the regular disk list comes back empty

use crate::core::system_info::types::DiskInfo;
use std::io;

/// Conventional mount points probed on Unix
#[cfg(unix)]
pub const FALLBACK_MOUNT_POINTS: &[&str] = &[
    "/",
    "/home",
    "/boot",
    "/var",
    "/tmp",
    "/mnt",
    "/media",
    "/System/Volumes/Data",
];

/// `(total, free)` bytes for the filesystem holding `path`.
#[cfg(unix)]
pub fn volume_usage(path: &str) -> io::Result<(u64, u64)> {
    use std::ffi::CString;

    let c_path = CString::new(path).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };

    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    let fragment = stat.f_frsize as u64;
    Ok((
        (stat.f_blocks as u64).saturating_mul(fragment),
        (stat.f_bavail as u64).saturating_mul(fragment),
    ))
}

#[cfg(windows)]
pub fn volume_usage(path: &str) -> io::Result<(u64, u64)> {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;

    let wide: Vec<u16> = std::ffi::OsStr::new(path)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut free_to_caller = 0u64;
    let mut total = 0u64;
    let mut total_free = 0u64;

    let ok = unsafe {
        GetDiskFreeSpaceExW(wide.as_ptr(), &mut free_to_caller, &mut total, &mut total_free)
    };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }

    Ok((total, free_to_caller))
}

/// Probe `paths`, keeping those that report a non-zero size.
///
/// Duplicate filesystems (same size figures) are reported once.
pub fn probe_volumes<F>(paths: &[String], fstype: &str, usage: F) -> Vec<DiskInfo>
where
    F: Fn(&str) -> io::Result<(u64, u64)>,
{
    let mut seen = Vec::new();
    let mut volumes = Vec::new();

    for path in paths {
        match usage(path) {
            Ok((total, free)) if total > 0 => {
                if seen.contains(&(total, free)) {
                    continue;
                }
                seen.push((total, free));
                volumes.push(DiskInfo::from_usage(
                    path.clone(),
                    path.clone(),
                    fstype.to_string(),
                    total,
                    free,
                ));
            }
            Ok(_) => {}
            Err(e) => log::debug!("Volume probe {} failed: {}", path, e),
        }
    }

    volumes
}

#[cfg(unix)]
pub fn fallback_volumes() -> Vec<DiskInfo> {
    let paths: Vec<String> = FALLBACK_MOUNT_POINTS.iter().map(|p| p.to_string()).collect();
    probe_volumes(&paths, "unknown", volume_usage)
}

#[cfg(windows)]
pub fn fallback_volumes() -> Vec<DiskInfo> {
    use crate::platform::system::windows::storage::fixed_logical_disks;

    match fixed_logical_disks() {
        Ok(disks) if !disks.is_empty() => return disks,
        Ok(_) => log::debug!("WMI reported no fixed logical disks"),
        Err(e) => log::warn!("WMI logical disk query failed: {}", e),
    }

    let drives: Vec<String> = (b'C'..=b'Z').map(|l| format!("{}:\\", l as char)).collect();
    probe_volumes(&drives, "NTFS", volume_usage)
}

#[cfg(not(any(unix, windows)))]
pub fn fallback_volumes() -> Vec<DiskInfo> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_skips_failures_and_duplicates() {
        let paths: Vec<String> = ["/", "/home", "/missing", "/empty"].iter().map(|s| s.to_string()).collect();

        let volumes = probe_volumes(&paths, "unknown", |p| match p {
            "/" | "/home" => Ok((1000, 400)),
            "/empty" => Ok((0, 0)),
            _ => Err(io::Error::from(io::ErrorKind::NotFound)),
        });

        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].mountpoint, "/");
        assert_eq!(volumes[0].used, 600);
    }

    #[cfg(unix)]
    #[test]
    fn test_root_volume_has_size() {
        let (total, free) = volume_usage("/").unwrap();
        assert!(total > 0);
        assert!(free <= total);
    }
}
