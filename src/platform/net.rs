use crate::core::system_info::network::{
    established, AddressKind, ConnectionSource, InterfaceAddress, InterfaceSource, IoCounterSource,
    ESTABLISHED,
};
use crate::core::system_info::types::{ConnectionInfo, IoCounters};
use crate::error::Result;
use crate::platform::command::run_command;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use sysinfo::Networks;

/// Interface list and counters from sysinfo's network table.
pub struct SysinfoNetworks;

impl IoCounterSource for SysinfoNetworks {
    fn io_counters(&self) -> Result<IoCounters> {
        let networks = Networks::new_with_refreshed_list();

        Ok(networks
            .iter()
            .fold(IoCounters::default(), |mut acc, (_, data)| {
                acc.bytes_sent += data.total_transmitted();
                acc.bytes_recv += data.total_received();
                acc.packets_sent += data.total_packets_transmitted();
                acc.packets_recv += data.total_packets_received();
                acc.errin += data.total_errors_on_received();
                acc.errout += data.total_errors_on_transmitted();
                acc
            }))
    }
}

impl InterfaceSource for SysinfoNetworks {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>> {
        let networks = Networks::new_with_refreshed_list();

        let mut names: Vec<&String> = networks.keys().collect();
        names.sort();

        let mut addresses = Vec::new();
        for name in names {
            let Some(data) = networks.get(name) else {
                continue;
            };

            for network in data.ip_networks() {
                addresses.push(InterfaceAddress::ip(name.clone(), network.addr));
            }

            let mac = data.mac_address();
            if !mac.is_unspecified() {
                addresses.push(InterfaceAddress {
                    interface: name.clone(),
                    kind: AddressKind::Link(mac.to_string()),
                });
            }
        }

        Ok(addresses)
    }
}

/// `netstat -an` for platforms without procfs.
pub struct NetstatConnections;

/// Endpoint as printed by netstat: `ip:port`, `[v6]:port`, or the BSD
/// `ip.port` form.
pub fn parse_netstat_endpoint(field: &str) -> Option<SocketAddr> {
    if let Ok(addr) = field.parse::<SocketAddr>() {
        return Some(addr);
    }

    let (ip, port) = field.rsplit_once('.')?;
    let ip = ip.split('%').next()?;
    Some(SocketAddr::new(ip.parse::<IpAddr>().ok()?, port.parse().ok()?))
}

/// Established TCP rows of `netstat -an` output (Windows and BSD layouts).
pub fn parse_netstat_output(output: &str) -> Vec<ConnectionInfo> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.last() != Some(&ESTABLISHED) || fields.len() < 4 {
                return None;
            }
            if !fields[0].to_lowercase().starts_with("tcp") {
                return None;
            }

            let remote = parse_netstat_endpoint(fields[fields.len() - 2])?;
            let local = parse_netstat_endpoint(fields[fields.len() - 3])?;
            Some(established(&local, &remote))
        })
        .collect()
}

impl ConnectionSource for NetstatConnections {
    fn connections(&self) -> Result<Vec<ConnectionInfo>> {
        Ok(parse_netstat_output(&run_command("netstat", &["-an"])?))
    }
}

pub fn default_connections() -> Arc<dyn ConnectionSource> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(crate::platform::system::linux::ProcNetConnections::default())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(NetstatConnections)
    }
}
