//! External command execution

use crate::error::{HostscopeError, Result};
use std::io;
use std::process::Command;

/// Run a program and return its stdout.
///
/// A missing binary is reported as `SourceUnavailable` so callers can fall
/// through to the next source quietly.
pub fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            HostscopeError::source_unavailable(format!("'{}' is not installed", program))
        } else {
            HostscopeError::Io(e)
        }
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(HostscopeError::subsystem(format!(
            "Command '{}' failed with exit code: {:?}",
            program,
            output.status.code()
        )))
    }
}
