use super::core::{lenient_u64, non_empty, wmi_connection, wmi_query};
use crate::core::system_info::hardware::{
    BaseboardRecord, HardwareInventorySource, NetworkAdapterRecord, ProcessorRecord,
    VideoControllerRecord,
};
use crate::error::Result;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32Processor {
    name: Option<String>,
    manufacturer: Option<String>,
    number_of_cores: Option<u32>,
    number_of_logical_processors: Option<u32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32VideoController {
    name: Option<String>,
    driver_version: Option<String>,
    status: Option<String>,
    #[serde(rename = "AdapterRAM", default, deserialize_with = "lenient_u64")]
    adapter_ram: Option<u64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32BaseBoard {
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32NetworkAdapter {
    name: Option<String>,
    description: Option<String>,
    manufacturer: Option<String>,
    #[serde(rename = "DeviceID")]
    device_id: Option<String>,
    #[serde(rename = "MACAddress")]
    mac_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    speed: Option<u64>,
    physical_adapter: Option<bool>,
    net_enabled: Option<bool>,
    status: Option<String>,
}

/// Inventory from the CIMV2 management classes.
pub struct WmiInventory;

impl HardwareInventorySource for WmiInventory {
    fn name(&self) -> &'static str {
        "WMI"
    }

    fn processor(&self) -> Result<Option<ProcessorRecord>> {
        let wmi = wmi_connection()?;
        let processors: Vec<Win32Processor> = wmi_query(
            &wmi,
            "SELECT Name, Manufacturer, NumberOfCores, NumberOfLogicalProcessors FROM Win32_Processor",
        )?;

        Ok(processors.into_iter().next().map(|p| ProcessorRecord {
            name: non_empty(p.name).unwrap_or_else(|| "Unknown".to_string()),
            manufacturer: non_empty(p.manufacturer).unwrap_or_default(),
            cores: p.number_of_cores.unwrap_or(0),
            logical_processors: p.number_of_logical_processors.unwrap_or(0),
        }))
    }

    fn video_controllers(&self) -> Result<Vec<VideoControllerRecord>> {
        let wmi = wmi_connection()?;
        let controllers: Vec<Win32VideoController> = wmi_query(
            &wmi,
            "SELECT Name, DriverVersion, Status, AdapterRAM FROM Win32_VideoController",
        )?;

        Ok(controllers
            .into_iter()
            .filter_map(|c| {
                Some(VideoControllerRecord {
                    name: non_empty(c.name)?,
                    driver_version: non_empty(c.driver_version),
                    status: non_empty(c.status),
                    adapter_ram: c.adapter_ram,
                })
            })
            .collect())
    }

    fn baseboard(&self) -> Result<Option<BaseboardRecord>> {
        let wmi = wmi_connection()?;
        let boards: Vec<Win32BaseBoard> = wmi_query(
            &wmi,
            "SELECT Manufacturer, Product, SerialNumber FROM Win32_BaseBoard",
        )?;

        Ok(boards.into_iter().next().map(|b| BaseboardRecord {
            manufacturer: non_empty(b.manufacturer),
            product: non_empty(b.product),
            serial_number: non_empty(b.serial_number),
        }))
    }

    fn network_adapters(&self) -> Result<Vec<NetworkAdapterRecord>> {
        let wmi = wmi_connection()?;
        let adapters: Vec<Win32NetworkAdapter> = wmi_query(
            &wmi,
            "SELECT Name, Description, Manufacturer, DeviceID, MACAddress, Speed, PhysicalAdapter, NetEnabled, Status FROM Win32_NetworkAdapter",
        )?;

        Ok(adapters
            .into_iter()
            .map(|a| NetworkAdapterRecord {
                name: non_empty(a.name),
                description: non_empty(a.description),
                manufacturer: non_empty(a.manufacturer),
                device_id: non_empty(a.device_id),
                mac_address: non_empty(a.mac_address),
                speed: a.speed,
                physical: a.physical_adapter.unwrap_or(false),
                enabled: a.net_enabled.unwrap_or(false),
                status: non_empty(a.status),
                wireless: None,
            })
            .collect())
    }
}
