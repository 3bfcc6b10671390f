#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(windows)]
pub mod windows;
