//! # Archive Exclusion Rules (`common::archive::exclude`)
//!
//! File: cli/src/common/archive/exclude.rs
//! Author: Christi Mahu
//!
//! Rules are glob patterns matched against a single path component (a file or
//! directory name), so they apply at every depth. An excluded directory is not
//! descended into.
//!
//! Built-in rules:
//! - `.git`: version-control metadata (directory, or file in worktrees/submodules)
//! - `.gitignore`
//! - `*.zip`: earlier builds and the archive currently being written
//!
use crate::core::error::{ModpackError, Result};
use glob::Pattern;
use std::ffi::OsStr;

pub const VCS_METADATA_DIR: &str = ".git";
pub const VCS_IGNORE_FILE: &str = ".gitignore";
pub const ARCHIVE_PATTERN: &str = "*.zip";

/// A set of name patterns that keep entries out of the archive.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    patterns: Vec<Pattern>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExclusionRules {
    /// Only the built-in rules.
    pub fn builtin() -> Self {
        let patterns = [VCS_METADATA_DIR, VCS_IGNORE_FILE, ARCHIVE_PATTERN]
            .iter()
            .map(|p| Pattern::new(p).expect("built-in exclusion patterns are valid"))
            .collect();
        Self { patterns }
    }

    /// Built-in rules plus `extra` patterns.
    pub fn with_extra<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::builtin();
        for source in extra {
            let source = source.as_ref();
            let pattern = Pattern::new(source).map_err(|e| {
                ModpackError::Config(format!("Invalid exclude pattern '{}': {}", source, e))
            })?;
            rules.patterns.push(pattern);
        }
        Ok(rules)
    }

    /// True if a path component called `name` is excluded.
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&name))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }
}
