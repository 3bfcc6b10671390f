use crate::error::{HostscopeError, Result};
use serde::{Deserialize, Deserializer};
use wmi::WMIConnection;

/// Connection to the default `root\CIMV2` namespace.
pub fn wmi_connection() -> Result<WMIConnection> {
    WMIConnection::new()
        .map_err(|e| HostscopeError::source_unavailable(format!("Failed to connect to WMI: {}", e)))
}

pub fn wmi_namespace(namespace: &str) -> Result<WMIConnection> {
    WMIConnection::with_namespace_path(namespace).map_err(|e| {
        HostscopeError::source_unavailable(format!("Failed to connect to WMI {}: {}", namespace, e))
    })
}

pub fn wmi_query<T>(connection: &WMIConnection, query: &str) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    connection
        .raw_query(query)
        .map_err(|e| HostscopeError::subsystem(format!("WMI query failed ({}): {}", query, e)))
}

/// WMI hands out `uint64` properties as strings.
pub fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Speed {
        #[serde(default, deserialize_with = "lenient_u64")]
        speed: Option<u64>,
    }

    #[test]
    fn test_lenient_u64() {
        let s: Speed = serde_json::from_str(r#"{"speed": "866700000"}"#).unwrap();
        assert_eq!(s.speed, Some(866_700_000));
        let s: Speed = serde_json::from_str(r#"{"speed": 1000}"#).unwrap();
        assert_eq!(s.speed, Some(1000));
        let s: Speed = serde_json::from_str(r#"{"speed": null}"#).unwrap();
        assert_eq!(s.speed, None);
        let s: Speed = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(s.speed, None);
    }
}
