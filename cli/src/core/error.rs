//! # Modpack Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout Modpack. Every
//! failure a packaging run can hit is one variant of `ModpackError`, so call
//! sites that need to branch on the kind of failure (the destination fallback,
//! the exit code in `main`) can downcast instead of matching on strings.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `ModpackError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The variants group into the failure domains of a run:
//! - Descriptor errors (missing or unparseable `info.json`). Fatal, raised
//!   before anything on disk is touched.
//! - Destination errors (missing or non-directory output path). Recoverable:
//!   the caller falls back to the current directory with pruning disabled.
//! - Encoding and integrity errors. Fatal to the build; the partial archive is
//!   removed.
//! - Version-control errors. Fatal; `InconsistentWorkingTree` is the internal
//!   consistency check after a stash.
//!
//! ## Examples
//!
//! ```rust
//! // Raise a specific error
//! if !path.exists() {
//!     anyhow::bail!(ModpackError::DescriptorNotFound { path: path.to_path_buf() });
//! }
//!
//! // Branch on a specific kind
//! match result {
//!     Err(e) if e.downcast_ref::<ModpackError>().is_some_and(ModpackError::is_destination) => {
//!         // fall back to the current directory
//!     }
//!     other => other?,
//! }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for Modpack.
#[derive(Error, Debug)]
pub enum ModpackError {
    #[error("Descriptor file not found: {}", path.display())]
    DescriptorNotFound { path: PathBuf },

    #[error("Descriptor file '{}' is malformed: {reason}", path.display())]
    DescriptorMalformed { path: PathBuf, reason: String },

    #[error("Destination '{}' does not exist", path.display())]
    DestinationMissing { path: PathBuf },

    #[error("Destination '{}' is not a directory", path.display())]
    DestinationNotADirectory { path: PathBuf },

    #[error("Path '{path}' contains '{character}', which cannot be encoded in code page 437")]
    Encoding { path: String, character: char },

    #[error("Archive '{}' failed verification at entry '{entry}': {reason}", archive.display())]
    Integrity {
        archive: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("Version control operation '{operation}' failed: {detail}")]
    VersionControl { operation: String, detail: String },

    #[error("Working tree is still dirty after stashing; refusing to package an inconsistent state")]
    InconsistentWorkingTree,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External command failed: {cmd}, Status: {status}, Output:\n{output}")]
    ExternalCommand {
        cmd: String,
        status: String,
        output: String,
    },
}

impl ModpackError {
    /// True for the missing/unparseable descriptor variants.
    pub fn is_descriptor(&self) -> bool {
        matches!(
            self,
            Self::DescriptorNotFound { .. } | Self::DescriptorMalformed { .. }
        )
    }

    /// True for the variants the destination fallback recovers from.
    pub fn is_destination(&self) -> bool {
        matches!(
            self,
            Self::DestinationMissing { .. } | Self::DestinationNotADirectory { .. }
        )
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
