//! # Modpack Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Thin wrappers around `std::process::Command` for running external tools
//! (currently only `git`) with captured output. Callers decide what a
//! non-zero exit means; `run_command_checked` is the shortcut for "anything
//! but success is an error".
//!
//! ```rust
//! use crate::common::process;
//! # fn run_example() -> crate::core::error::Result<()> {
//! let output = process::run_command_capture("git", &["status", "--porcelain"], Some(Path::new(".")))?;
//! if !output.stdout.is_empty() {
//!     println!("Working tree has changes");
//! }
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{ModpackError, Result};
use anyhow::Context;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// stdout followed by stderr, trimmed.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

/// Runs `program` with `args`, capturing stdout and stderr.
///
/// # Errors
///
/// Returns an `Err` only if the process could not be started (e.g. the
/// program is not installed). A non-zero exit status is reported through
/// `CommandOutput::status`.
pub fn run_command_capture(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!("Running: {} {}", program, args.join(" "));
    let output = command
        .output()
        .with_context(|| format!("Failed to execute '{}'", program))?;

    let captured = CommandOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        "'{} {}' finished: status={}, stdout='{}', stderr='{}'",
        program,
        args.join(" "),
        captured.status,
        captured.stdout.trim(),
        captured.stderr.trim()
    );
    Ok(captured)
}

/// Like `run_command_capture`, but a non-zero exit becomes
/// `ModpackError::ExternalCommand`.
pub fn run_command_checked(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
    let output = run_command_capture(program, args, cwd)?;
    if !output.success() {
        anyhow::bail!(ModpackError::ExternalCommand {
            cmd: format!("{} {}", program, args.join(" ")),
            status: output.status.to_string(),
            output: output.combined(),
        });
    }
    Ok(output)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_error() {
        let result = run_command_capture("modpack-no-such-program-12345", &[], None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to execute"));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_and_checked() -> Result<()> {
        let output = run_command_capture("sh", &["-c", "echo out; echo err >&2"], None)?;
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.combined(), "out\nerr");

        let failed = run_command_checked("sh", &["-c", "echo boom >&2; exit 3"], None);
        let err = failed.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModpackError>(),
            Some(ModpackError::ExternalCommand { .. })
        ));
        assert!(err.to_string().contains("boom"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_working_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("marker.txt"), "")?;
        let output = run_command_capture("ls", &[], Some(dir.path()))?;
        assert!(output.stdout.contains("marker.txt"));
        Ok(())
    }
}
