//! # Modpack Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything needed to turn a project tree into `name_version.zip`:
//!
//! - **`exclude`**: names that never enter the archive (`.git`, `.gitignore`,
//!   `*.zip`, plus configured patterns), applied at every directory level.
//! - **`codepage`**: entry names must be representable in IBM code page 437,
//!   the legacy ZIP name encoding. Anything else fails the build.
//! - **`writer`**: the ZIP container itself, with entry names stored as raw
//!   CP437 bytes (the UTF-8 name flag is never set).
//! - **`zip`**: walks the tree, writes the deflated entries, verifies the
//!   result and removes the file again if any step failed.
//! - **`verify`**: re-reads every entry of a finished archive (CRC check).
//!
//! ## Layouts
//!
//! Two entry layouts exist. `Flat` stores `control.lua` as `control.lua` and
//! is the default: the game's loader rejected the nested form in practice.
//! `Nested` stores it as `<name_version>/control.lua` and is kept as an
//! explicit opt-in for compatibility testing.
//!
//! ```rust
//! use crate::common::archive::{self, ArchiveOptions};
//! use std::path::Path;
//!
//! # fn run() -> anyhow::Result<()> {
//! let report = archive::zip::build_archive(
//!     Path::new("."),
//!     "train_whistle_1.2.0",
//!     Path::new("./out"),
//!     &ArchiveOptions::default(),
//! )?;
//! println!("{} entries in {}", report.entries, report.path.display());
//! # Ok(())
//! # }
//! ```
//!
use serde::Deserialize;
use std::path::PathBuf;

pub mod codepage;
pub mod exclude;
pub mod verify;
pub mod writer;
pub mod zip;

pub use exclude::ExclusionRules;

/// How entry paths are laid out inside the archive.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveLayout {
    /// Entries at their path relative to the project root.
    #[default]
    Flat,
    /// Entries under a top-level folder named after the archive.
    Nested,
}

impl ArchiveLayout {
    /// Archive entry name for a `/`-separated path relative to the project root.
    pub fn entry_name(self, archive_name: &str, relative: &str) -> String {
        match self {
            ArchiveLayout::Flat => relative.to_string(),
            ArchiveLayout::Nested => format!("{}/{}", archive_name, relative),
        }
    }
}

/// Settings for a single build.
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub layout: ArchiveLayout,
    pub exclusions: ExclusionRules,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Final location, `<destination>/<archive_name>.zip`.
    pub path: PathBuf,
    /// Number of file entries written and verified.
    pub entries: usize,
}
