use std::io;
use thiserror::Error;

/// Custom error type for hostscope
#[derive(Error, Debug)]
pub enum HostscopeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Subsystem failed: {0}")]
    Subsystem(String),

    #[error("Could not retrieve system information")]
    AllSubsystemsFailed,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hostscope
pub type Result<T> = std::result::Result<T, HostscopeError>;

impl HostscopeError {
    /// Create a "this data source is not present here" error
    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        HostscopeError::SourceUnavailable(msg.into())
    }

    pub fn parse<S: Into<String>>(msg: S) -> Self {
        HostscopeError::Parse(msg.into())
    }

    pub fn subsystem<S: Into<String>>(msg: S) -> Self {
        HostscopeError::Subsystem(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HostscopeError::Other(msg.into())
    }
}
