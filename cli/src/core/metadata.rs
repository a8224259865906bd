//! # Modpack Project Metadata
//!
//! File: cli/src/core/metadata.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Reads the mod descriptor (`info.json` by default) and extracts the two
//! fields Modpack cares about: `name` and `version`. Together they form the
//! archive base name `name_version`. Every other field in the descriptor
//! (title, author, dependencies, ...) is ignored.
//!
//! `version` is used verbatim; no semantic-version validation is performed.
//!
use crate::core::error::{ModpackError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Name and version of the project being packaged. Parsed once per run.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
}

impl ProjectMetadata {
    /// Base name of the output archive, without the `.zip` extension.
    pub fn archive_name(&self) -> String {
        format!("{}_{}", self.name, self.version)
    }
}

/// Reads and validates the descriptor at `path`.
///
/// # Errors
///
/// - `ModpackError::DescriptorNotFound` if the file does not exist.
/// - `ModpackError::DescriptorMalformed` if it is not valid JSON, lacks
///   `name`/`version`, or either field is empty or contains a path separator.
/// - An I/O error (with context) if the file exists but cannot be read.
pub fn read(path: &Path) -> Result<ProjectMetadata> {
    if !path.is_file() {
        anyhow::bail!(ModpackError::DescriptorNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = crate::common::fs::io::read_file_to_string(path)?;
    let metadata: ProjectMetadata =
        serde_json::from_str(&content).map_err(|e| ModpackError::DescriptorMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    for (field, value) in [("name", &metadata.name), ("version", &metadata.version)] {
        if let Some(reason) = invalid_field_reason(value) {
            anyhow::bail!(ModpackError::DescriptorMalformed {
                path: path.to_path_buf(),
                reason: format!("field `{}` {}", field, reason),
            });
        }
    }

    debug!(
        "Read descriptor {}: name={}, version={}",
        path.display(),
        metadata.name,
        metadata.version
    );
    Ok(metadata)
}

fn invalid_field_reason(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some("is empty")
    } else if value.contains(['/', '\\']) {
        Some("contains a path separator")
    } else {
        None
    }
}
