use crate::core::system_info::types::PlatformInfo;
use crate::error::{HostscopeError, Result};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

pub fn collect() -> Result<PlatformInfo> {
    let release = System::kernel_version()
        .or_else(System::os_version)
        .ok_or_else(|| HostscopeError::source_unavailable("OS release not reported"))?;

    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    let processor = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());

    Ok(PlatformInfo {
        system: system_name(std::env::consts::OS),
        release,
        version: System::long_os_version().unwrap_or_default(),
        architecture: std::env::consts::ARCH.to_string(),
        processor,
    })
}

/// Conventional OS family name, `Linux`, `Windows`, `Darwin`, ...
pub fn system_name(os: &str) -> String {
    match os {
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "macos" => "Darwin".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_names() {
        assert_eq!(system_name("linux"), "Linux");
        assert_eq!(system_name("macos"), "Darwin");
        assert_eq!(system_name("solaris"), "Solaris");
        assert_eq!(system_name(""), "");
    }
}
