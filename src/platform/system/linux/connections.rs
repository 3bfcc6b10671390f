//! Established TCP connections from `/proc/net/tcp` and `/proc/net/tcp6`.

use crate::core::system_info::network::{established, ConnectionSource};
use crate::core::system_info::types::ConnectionInfo;
use crate::error::{HostscopeError, Result};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// Kernel `TCP_ESTABLISHED` state code
const TCP_ESTABLISHED: &str = "01";

const TABLES: &[&str] = &["net/tcp", "net/tcp6"];

pub struct ProcNetConnections {
    proc_root: PathBuf,
}

impl Default for ProcNetConnections {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcNetConnections {
    pub fn new<P: Into<PathBuf>>(proc_root: P) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }
}

/// Decode a hex `ADDR:PORT` pair. Address words are in host byte order.
pub fn parse_hex_socket(field: &str) -> Result<SocketAddr> {
    let (addr, port) = field
        .split_once(':')
        .ok_or_else(|| HostscopeError::parse(format!("missing port in '{}'", field)))?;

    let port = u16::from_str_radix(port, 16)
        .map_err(|e| HostscopeError::parse(format!("bad port '{}': {}", port, e)))?;

    let word = |chunk: &str| {
        u32::from_str_radix(chunk, 16)
            .map(u32::to_ne_bytes)
            .map_err(|e| HostscopeError::parse(format!("bad address '{}': {}", addr, e)))
    };

    let ip = match addr.len() {
        8 => IpAddr::V4(Ipv4Addr::from(word(addr)?)),
        32 => {
            let mut octets = [0u8; 16];
            for i in 0..4 {
                let chunk = addr
                    .get(i * 8..i * 8 + 8)
                    .ok_or_else(|| HostscopeError::parse(format!("bad address '{}'", addr)))?;
                octets[i * 4..i * 4 + 4].copy_from_slice(&word(chunk)?);
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        n => {
            return Err(HostscopeError::parse(format!(
                "unexpected address length {} in '{}'",
                n, field
            )))
        }
    };

    Ok(SocketAddr::new(ip, port))
}

/// Established entries of one `/proc/net/tcp*` table. Malformed rows are skipped.
pub fn parse_proc_net_tcp(text: &str) -> Vec<ConnectionInfo> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (local, remote, state) = (fields.get(1)?, fields.get(2)?, fields.get(3)?);
            if *state != TCP_ESTABLISHED {
                return None;
            }

            match (parse_hex_socket(local), parse_hex_socket(remote)) {
                (Ok(local), Ok(remote)) => Some(established(&local, &remote)),
                (Err(e), _) | (_, Err(e)) => {
                    log::debug!("Skipping socket row: {}", e);
                    None
                }
            }
        })
        .collect()
}

impl ConnectionSource for ProcNetConnections {
    fn connections(&self) -> Result<Vec<ConnectionInfo>> {
        let mut connections = Vec::new();
        let mut read_any = false;

        for table in TABLES {
            match fs::read_to_string(self.proc_root.join(table)) {
                Ok(text) => {
                    read_any = true;
                    connections.extend(parse_proc_net_tcp(&text));
                }
                // tcp6 is absent when IPv6 is disabled
                Err(e) => log::debug!("Cannot read /proc/{}: {}", table, e),
            }
        }

        if !read_any {
            return Err(HostscopeError::source_unavailable("no /proc/net/tcp tables"));
        }
        Ok(connections)
    }
}
