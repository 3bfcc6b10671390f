use crate::core::system_info::geolocation::GeoResolver;
use crate::core::system_info::io_offset::IoCounterOffsetStore;
use crate::core::system_info::types::{ConnectionInfo, InterfaceAddressInfo, IoCounters, NetworkInfo};
use crate::error::Result;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

#[cfg(target_os = "linux")]
const LINK_FAMILY: &str = "AF_PACKET";
#[cfg(not(target_os = "linux"))]
const LINK_FAMILY: &str = "AF_LINK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressKind {
    Ip(IpAddr),
    /// Hardware address, `aa:bb:cc:dd:ee:ff`
    Link(String),
}

/// One address bound to a network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub interface: String,
    pub kind: AddressKind,
}

impl InterfaceAddress {
    pub fn ip<S: Into<String>>(interface: S, ip: IpAddr) -> Self {
        Self {
            interface: interface.into(),
            kind: AddressKind::Ip(ip),
        }
    }

    pub fn family(&self) -> &'static str {
        match self.kind {
            AddressKind::Ip(IpAddr::V4(_)) => "AF_INET",
            AddressKind::Ip(IpAddr::V6(_)) => "AF_INET6",
            AddressKind::Link(_) => LINK_FAMILY,
        }
    }

    pub fn address(&self) -> String {
        match &self.kind {
            AddressKind::Ip(ip) => ip.to_string(),
            AddressKind::Link(mac) => mac.clone(),
        }
    }
}

/// Enumerates interface addresses.
pub trait InterfaceSource: Send + Sync {
    fn addresses(&self) -> Result<Vec<InterfaceAddress>>;
}

/// Cumulative network counters summed over all interfaces.
pub trait IoCounterSource: Send + Sync {
    fn io_counters(&self) -> Result<IoCounters>;
}

/// Only connections in this state are reported
pub const ESTABLISHED: &str = "ESTABLISHED";

/// Lists established TCP connections.
pub trait ConnectionSource: Send + Sync {
    fn connections(&self) -> Result<Vec<ConnectionInfo>>;
}

/// `ip:port`, unbracketed for IPv6.
pub fn endpoint(addr: &SocketAddr) -> String {
    format!("{}:{}", addr.ip(), addr.port())
}

pub fn established(local: &SocketAddr, remote: &SocketAddr) -> ConnectionInfo {
    ConnectionInfo {
        local_address: endpoint(local),
        remote_address: endpoint(remote),
        status: ESTABLISHED.to_string(),
    }
}

fn is_link_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}

fn usable_v4(ip: &Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_link_local() && !ip.is_unspecified()
}

fn usable_v6(ip: &Ipv6Addr) -> bool {
    !ip.is_loopback() && !is_link_local_v6(ip) && !ip.is_unspecified()
}

/// First IPv4 address that is neither loopback nor link-local.
pub fn first_local_ipv4(addresses: &[InterfaceAddress]) -> Option<Ipv4Addr> {
    addresses.iter().find_map(|a| match a.kind {
        AddressKind::Ip(IpAddr::V4(ip)) if usable_v4(&ip) => Some(ip),
        _ => None,
    })
}

/// First IPv6 address that is neither loopback nor link-local.
pub fn first_local_ipv6(addresses: &[InterfaceAddress]) -> Option<Ipv6Addr> {
    addresses.iter().find_map(|a| match a.kind {
        AddressKind::Ip(IpAddr::V6(ip)) if usable_v6(&ip) => Some(ip),
        _ => None,
    })
}

/// Group addresses by interface name, keeping enumeration order within each.
pub fn group_by_interface(
    addresses: &[InterfaceAddress],
) -> BTreeMap<String, Vec<InterfaceAddressInfo>> {
    let mut grouped: BTreeMap<String, Vec<InterfaceAddressInfo>> = BTreeMap::new();
    for addr in addresses {
        grouped
            .entry(addr.interface.clone())
            .or_default()
            .push(InterfaceAddressInfo {
                family: addr.family().to_string(),
                address: addr.address(),
            });
    }
    grouped
}

/// Network section: offset-adjusted counters, interface addresses,
/// established connections, public IP.
pub fn collect(
    counters: &dyn IoCounterSource,
    interfaces: &dyn InterfaceSource,
    connections: &dyn ConnectionSource,
    offsets: &IoCounterOffsetStore,
    geo: &GeoResolver,
) -> Result<NetworkInfo> {
    let io_counters = offsets.apply(counters.io_counters()?);

    let interfaces = match interfaces.addresses() {
        Ok(addresses) => group_by_interface(&addresses),
        Err(e) => {
            log::warn!("Interface enumeration failed: {}", e);
            BTreeMap::new()
        }
    };

    let connections = connections.connections().unwrap_or_else(|e| {
        log::warn!("Connection listing failed: {}", e);
        Vec::new()
    });

    Ok(NetworkInfo {
        io_counters,
        interfaces,
        connections,
        ip_info: geo.resolve(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(iface: &str, s: &str) -> InterfaceAddress {
        InterfaceAddress::ip(iface, IpAddr::V4(s.parse().unwrap()))
    }

    fn v6(iface: &str, s: &str) -> InterfaceAddress {
        InterfaceAddress::ip(iface, IpAddr::V6(s.parse().unwrap()))
    }

    #[test]
    fn test_local_ipv4_skips_loopback_and_link_local() {
        let addrs = vec![
            v4("lo", "127.0.0.1"),
            v4("eth1", "169.254.10.2"),
            v4("eth0", "192.168.1.20"),
            v4("wlan0", "10.0.0.5"),
        ];
        assert_eq!(first_local_ipv4(&addrs), Some("192.168.1.20".parse().unwrap()));
    }

    #[test]
    fn test_local_ipv6_skips_loopback_and_link_local() {
        let addrs = vec![
            v6("lo", "::1"),
            v6("eth0", "fe80::1c2d:3eff:fe4f:5a6b"),
            v6("eth0", "2001:db8::42"),
        ];
        assert_eq!(first_local_ipv6(&addrs), Some("2001:db8::42".parse().unwrap()));
        assert_eq!(first_local_ipv6(&addrs[..2]), None);
    }

    #[test]
    fn test_group_by_interface_families() {
        let addrs = vec![
            v4("eth0", "192.168.1.20"),
            InterfaceAddress {
                interface: "eth0".into(),
                kind: AddressKind::Link("aa:bb:cc:dd:ee:ff".into()),
            },
            v6("lo", "::1"),
        ];

        let grouped = group_by_interface(&addrs);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["eth0"][0].family, "AF_INET");
        assert_eq!(grouped["eth0"][1].family, LINK_FAMILY);
        assert_eq!(grouped["eth0"][1].address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(grouped["lo"][0].family, "AF_INET6");
    }

    #[test]
    fn test_endpoint_format() {
        let v4: SocketAddr = "192.168.1.20:52344".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::42]:443".parse().unwrap();
        assert_eq!(endpoint(&v4), "192.168.1.20:52344");
        assert_eq!(endpoint(&v6), "2001:db8::42:443");

        let conn = established(&v4, &v6);
        assert_eq!(conn.status, "ESTABLISHED");
        assert_eq!(conn.remote_address, "2001:db8::42:443");
    }

    #[test]
    fn test_interface_family_serializes_as_type() {
        let grouped = group_by_interface(&[v4("eth0", "10.1.2.3")]);
        let json = serde_json::to_value(&grouped).unwrap();
        assert_eq!(json["eth0"][0]["type"], "AF_INET");
        assert_eq!(json["eth0"][0]["address"], "10.1.2.3");
    }
}
