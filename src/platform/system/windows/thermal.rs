use super::core::{wmi_connection, wmi_namespace, wmi_query};
use crate::core::system_info::temperature::{decikelvin_to_celsius, kelvin_to_celsius, TemperatureSource};
use crate::core::system_info::types::TemperatureReading;
use crate::error::Result;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct Win32TemperatureProbe {
    name: Option<String>,
    current_reading: Option<u32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct MsAcpiThermalZoneTemperature {
    instance_name: Option<String>,
    current_temperature: Option<u32>,
}

/// `Win32_TemperatureProbe`, reported in Kelvin.
pub struct WmiTemperatureProbeSource;

impl TemperatureSource for WmiTemperatureProbeSource {
    fn name(&self) -> &'static str {
        "WMI temperature probe"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        let wmi = wmi_connection()?;
        let probes: Vec<Win32TemperatureProbe> =
            wmi_query(&wmi, "SELECT Name, CurrentReading FROM Win32_TemperatureProbe")?;

        Ok(probes
            .into_iter()
            .filter_map(|p| {
                let celsius = kelvin_to_celsius(p.current_reading? as f32)?;
                let label = p.name.unwrap_or_else(|| "CPU".to_string());
                Some(TemperatureReading::new(label, celsius))
            })
            .collect())
    }
}

/// ACPI thermal zones in `root\WMI`, tenths of a Kelvin. Needs elevation on
/// most machines.
pub struct WmiThermalZoneSource;

impl TemperatureSource for WmiThermalZoneSource {
    fn name(&self) -> &'static str {
        "WMI ACPI thermal zone"
    }

    fn read(&self) -> Result<Vec<TemperatureReading>> {
        let wmi = wmi_namespace("root\\WMI")?;
        let zones: Vec<MsAcpiThermalZoneTemperature> = wmi_query(
            &wmi,
            "SELECT InstanceName, CurrentTemperature FROM MSAcpi_ThermalZoneTemperature",
        )?;

        Ok(zones
            .into_iter()
            .filter_map(|z| {
                let celsius = decikelvin_to_celsius(z.current_temperature? as f32);
                let label = z.instance_name.unwrap_or_else(|| "ThermalZone".to_string());
                Some(TemperatureReading::new(format!("ACPI {}", label), celsius))
            })
            .collect())
    }
}
