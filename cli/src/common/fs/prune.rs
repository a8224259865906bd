//! # Stale Version Pruning (`common::fs::prune`)
//!
//! File: cli/src/common/fs/prune.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Before a new archive is written, earlier builds of the same project are
//! deleted from the destination so the game only sees one version. Every
//! regular file matching `<name>*.zip` is removed.
//!
//! **Known limitation:** the match is a plain name prefix, so a different
//! project whose name starts with this one (`whistle` vs `whistle-extra`)
//! loses its archives too. Callers only prune a destination they have
//! confirmed, and pruning can be switched off (`--keep-old`).
//!
//! Deletion is irreversible and not rolled back if the subsequent build fails.
//!
use crate::common::fs::io;
use crate::core::error::Result;
use anyhow::Context;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pattern matching archives of `project_name`. Glob metacharacters in the
/// name are matched literally.
pub fn stale_pattern(project_name: &str) -> Result<Pattern> {
    let source = format!("{}*.zip", Pattern::escape(project_name));
    Pattern::new(&source).with_context(|| format!("Invalid prune pattern '{}'", source))
}

/// Lists the files `prune` would delete, sorted by name.
pub fn find_stale(destination: &Path, project_name: &str) -> Result<Vec<PathBuf>> {
    let pattern = stale_pattern(project_name)?;
    let entries = fs::read_dir(destination)
        .with_context(|| format!("Failed to list destination {:?}", destination))?;

    let mut stale = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list destination {:?}", destination))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name();
        if is_file && name.to_str().is_some_and(|n| pattern.matches(n)) {
            stale.push(entry.path());
        }
    }
    stale.sort();
    Ok(stale)
}

/// Deletes every `<project_name>*.zip` file in `destination` and returns the
/// removed paths.
pub fn prune(destination: &Path, project_name: &str) -> Result<Vec<PathBuf>> {
    let stale = find_stale(destination, project_name)?;
    if stale.is_empty() {
        debug!("No previous versions of '{}' to prune.", project_name);
    }
    let mut removed = Vec::with_capacity(stale.len());
    for path in stale {
        if io::remove_file_if_exists(&path)? {
            info!("Pruned previous version: {}", path.display());
            removed.push(path);
        }
    }
    Ok(removed)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"PK").unwrap();
    }

    #[test]
    fn test_prunes_only_matching_archives() -> Result<()> {
        let dir = tempdir()?;
        touch(dir.path(), "train_whistle_1.0.0.zip");
        touch(dir.path(), "train_whistle_1.1.0.zip");
        touch(dir.path(), "other_mod_1.0.0.zip");
        touch(dir.path(), "train_whistle_notes.txt");

        let removed = prune(dir.path(), "train_whistle")?;
        assert_eq!(
            removed,
            vec![
                dir.path().join("train_whistle_1.0.0.zip"),
                dir.path().join("train_whistle_1.1.0.zip"),
            ]
        );
        assert!(dir.path().join("other_mod_1.0.0.zip").exists());
        assert!(dir.path().join("train_whistle_notes.txt").exists());
        Ok(())
    }

    #[test]
    fn test_prefix_match_is_broad() -> Result<()> {
        let dir = tempdir()?;
        touch(dir.path(), "whistle-extra.zip");
        let removed = prune(dir.path(), "whistle")?;
        assert_eq!(removed.len(), 1);
        assert!(!dir.path().join("whistle-extra.zip").exists());
        Ok(())
    }

    #[test]
    fn test_directories_are_left_alone() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("whistle_1.0.0.zip"))?;
        assert!(prune(dir.path(), "whistle")?.is_empty());
        assert!(dir.path().join("whistle_1.0.0.zip").is_dir());
        Ok(())
    }

    #[test]
    fn test_name_metacharacters_match_literally() -> Result<()> {
        let dir = tempdir()?;
        touch(dir.path(), "w_1.0.zip");
        touch(dir.path(), "[w]_1.0.zip");
        let removed = prune(dir.path(), "[w]")?;
        assert_eq!(removed, vec![dir.path().join("[w]_1.0.zip")]);
        assert!(dir.path().join("w_1.0.zip").exists());
        Ok(())
    }

    #[test]
    fn test_missing_destination_is_error() {
        let dir = tempdir().unwrap();
        assert!(prune(&dir.path().join("missing"), "whistle").is_err());
    }
}
