//! # Modpack Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Small wrappers around `std::fs` that attach the offending path to any
//! error, so diagnostics always name the file involved.
//!
//! - **`read_file_to_string`**: reads a whole file (the descriptor).
//! - **`remove_file_if_exists`**: deletes a file, treating "already gone" as
//!   success (stale archives, partial archives after a failed build).
//!
use crate::core::error::Result;
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Reads the entire content of a file into a string.
///
/// # Errors
///
/// Returns an `Err` if the file cannot be found, opened, or read, with context
/// indicating which file failed.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Removes a file. Returns `Ok(true)` if it was deleted, `Ok(false)` if it
/// did not exist.
///
/// # Errors
///
/// Returns an `Err` for any failure other than the file being absent
/// (permissions, the path being a directory, ...).
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed file: {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove file {:?}", path)),
    }
}
