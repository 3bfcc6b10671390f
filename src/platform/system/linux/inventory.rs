//! Hardware inventory from procfs, sysfs and `lspci`.

use crate::core::system_info::hardware::{
    BaseboardRecord, HardwareInventorySource, NetworkAdapterRecord, ProcessorRecord,
    VideoControllerRecord,
};
use crate::error::{HostscopeError, Result};
use crate::platform::command::run_command;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const DISPLAY_CLASSES: &[&str] = &["VGA compatible controller", "3D controller", "Display controller"];

/// PCI vendor ids of common wireless chip makers
const PCI_VENDORS: &[(&str, &str)] = &[
    ("0x8086", "Intel Corporation"),
    ("0x10ec", "Realtek Semiconductor"),
    ("0x14e4", "Broadcom"),
    ("0x168c", "Qualcomm Atheros"),
    ("0x17cb", "Qualcomm"),
    ("0x14c3", "MediaTek"),
    ("0x1814", "Ralink"),
];

pub struct SysfsInventory {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl Default for SysfsInventory {
    fn default() -> Self {
        Self::new("/proc", "/sys")
    }
}

impl SysfsInventory {
    pub fn new<P: Into<PathBuf>, S: Into<PathBuf>>(proc_root: P, sys_root: S) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Processor identity and core counts from `/proc/cpuinfo`.
pub fn parse_cpuinfo(text: &str) -> Option<ProcessorRecord> {
    let mut name = None;
    let mut vendor = None;
    let mut logical = 0u32;
    let mut cores = HashSet::new();
    let mut physical_id = String::new();
    let mut cores_per_socket = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "processor" => logical += 1,
            "model name" | "Model" if name.is_none() => name = Some(value.to_string()),
            "vendor_id" if vendor.is_none() => vendor = Some(value.to_string()),
            "physical id" => physical_id = value.to_string(),
            "core id" => {
                cores.insert((physical_id.clone(), value.to_string()));
            }
            "cpu cores" if cores_per_socket.is_none() => cores_per_socket = value.parse::<u32>().ok(),
            _ => {}
        }
    }

    if logical == 0 {
        return None;
    }

    let physical = if !cores.is_empty() {
        cores.len() as u32
    } else {
        cores_per_socket.unwrap_or(logical)
    };

    Some(ProcessorRecord {
        name: name.unwrap_or_else(|| "Unknown".to_string()),
        manufacturer: vendor.unwrap_or_default(),
        cores: physical,
        logical_processors: logical,
    })
}

/// Split one `lspci -mm` line into its quoted fields.
fn lspci_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find('"') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('"') else {
            break;
        };
        fields.push(after[..end].to_string());
        rest = &after[end + 1..];
    }

    fields
}

/// Display controllers from `lspci -mm` output.
pub fn parse_lspci_display(output: &str) -> Vec<VideoControllerRecord> {
    output
        .lines()
        .filter_map(|line| {
            let fields = lspci_fields(line);
            let (class, vendor, device) = (fields.first()?, fields.get(1)?, fields.get(2)?);
            if !DISPLAY_CLASSES.iter().any(|c| class == c) {
                return None;
            }

            Some(VideoControllerRecord {
                name: format!("{} {}", vendor, device),
                driver_version: None,
                status: Some("OK".to_string()),
                adapter_ram: None,
            })
        })
        .collect()
}

fn pci_vendor_name(id: &str) -> Option<String> {
    PCI_VENDORS
        .iter()
        .find(|(vid, _)| vid.eq_ignore_ascii_case(id))
        .map(|(_, name)| name.to_string())
}

/// Physical interfaces under `<sys>/class/net`.
pub fn read_net_adapters(sys_root: &Path) -> Result<Vec<NetworkAdapterRecord>> {
    let net = sys_root.join("class/net");
    let mut entries: Vec<PathBuf> = fs::read_dir(&net)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    let mut adapters = Vec::new();
    for path in entries {
        let Some(iface) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        let wireless = path.join("wireless").exists() || path.join("phy80211").exists();
        let physical = path.join("device").exists();
        let operstate = read_trimmed(&path.join("operstate"));

        // Link speed is in Mb/s; wireless drivers often report -1
        let speed = read_trimmed(&path.join("speed"))
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|mbps| *mbps > 0)
            .map(|mbps| mbps as u64 * 1_000_000);

        adapters.push(NetworkAdapterRecord {
            name: Some(iface.clone()),
            description: None,
            manufacturer: read_trimmed(&path.join("device/vendor")).and_then(|id| pci_vendor_name(&id)),
            device_id: Some(iface),
            mac_address: read_trimmed(&path.join("address")).filter(|m| m != "00:00:00:00:00:00"),
            speed,
            physical,
            enabled: operstate.as_deref() == Some("up"),
            status: operstate,
            wireless: Some(wireless),
        });
    }

    Ok(adapters)
}

impl HardwareInventorySource for SysfsInventory {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn processor(&self) -> Result<Option<ProcessorRecord>> {
        let text = fs::read_to_string(self.proc_root.join("cpuinfo"))?;
        Ok(parse_cpuinfo(&text))
    }

    fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>> {
        Ok(parse_lspci_display(&run_command("lspci", &["-mm"])?))
    }

    fn baseboard(&self) -> Result<Option<BaseboardRecord>> {
        let dmi = self.sys_root.join("class/dmi/id");
        if !dmi.is_dir() {
            return Err(HostscopeError::source_unavailable("no DMI table"));
        }

        let record = BaseboardRecord {
            manufacturer: read_trimmed(&dmi.join("board_vendor")),
            product: read_trimmed(&dmi.join("board_name")),
            // Readable by root only
            serial_number: read_trimmed(&dmi.join("board_serial")),
        };

        if record == BaseboardRecord::default() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn network_adapters(&self) -> Result<Vec<NetworkAdapterRecord>> {
        read_net_adapters(&self.sys_root)
    }
}
