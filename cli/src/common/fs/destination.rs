//! # Destination Resolution (`common::fs::destination`)
//!
//! File: cli/src/common/fs/destination.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Decides where the archive is written. An explicit path wins; without one
//! the platform default (see `common::system`) is used, and on platforms with
//! no default (or when it cannot be expanded) the current directory. Both are
//! passed in by the caller, which keeps resolution independent of the
//! process environment.
//!
//! Whatever path is chosen must exist and be a directory. Resolution never
//! creates directories: a missing game install should be reported, not
//! papered over. Callers recover from a `Destination*` error by falling back
//! to the current directory with pruning disabled.
//!
use crate::core::error::{ModpackError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated, existing output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath(PathBuf);

impl DestinationPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for DestinationPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Picks and validates the destination.
///
/// `explicit` wins when present and non-empty. Otherwise `platform_default`
/// is used, or `current_dir` when the platform has no default.
pub fn resolve(
    explicit: Option<&Path>,
    platform_default: Option<PathBuf>,
    current_dir: &Path,
) -> Result<DestinationPath> {
    let chosen = match explicit.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => path.to_path_buf(),
        None => platform_default.unwrap_or_else(|| {
            debug!("No platform default destination, using the current directory.");
            current_dir.to_path_buf()
        }),
    };
    validate(&chosen)?;
    debug!("Resolved destination: {}", chosen.display());
    Ok(DestinationPath(chosen))
}

/// Accepts `path` as a destination if it exists and is a directory.
pub fn validate(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!(ModpackError::DestinationMissing {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        anyhow::bail!(ModpackError::DestinationNotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
