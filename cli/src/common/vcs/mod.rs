//! # Modpack Working-Tree Snapshots (`common::vcs`)
//!
//! File: cli/src/common/vcs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The archive must contain committed content only. When the working tree has
//! uncommitted changes, they are stashed before packaging and re-applied
//! afterwards, whether or not the build succeeded.
//!
//! ## Architecture
//!
//! - **`VersionControl`**: the operations the snapshot needs (`status`,
//!   `save`, `restore`), plus `untracked` for warning about files that are
//!   packaged without being committed. `git::GitCli` implements it over the
//!   git binary; tests substitute an in-memory tree.
//! - **`Snapshot`**: the value returned by `take_if_dirty`, recording whether
//!   a save happened. It is threaded explicitly to `restore`.
//! - **`SnapshotGuard`**: owns a snapshot for the duration of a run and
//!   restores it on every exit path. `release` reports restore errors; a guard
//!   dropped without `release` (early return, panic unwinding) still restores
//!   and logs any failure.
//!
//! The working tree is exclusively owned by the run; two concurrent runs on
//! the same tree would interleave their stash/restore sequences.
//!
//! ```rust
//! let mut git = GitCli::new(project_root, false);
//! let guard = SnapshotGuard::take(&mut git, RestoreMode::Pop)?;
//! let built = build_archive(...);
//! guard.release()?;
//! ```
//!
use crate::core::error::{ModpackError, Result};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

pub mod git;

/// How saved changes are re-applied.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RestoreMode {
    /// Re-apply and drop the stash entry.
    #[default]
    Pop,
    /// Re-apply and keep the stash entry.
    Apply,
}

/// Operations on a version-controlled working tree.
pub trait VersionControl {
    /// Machine-readable status. Empty output means the tree is clean.
    fn status(&self) -> Result<String>;
    /// Sets uncommitted changes aside, leaving the committed state.
    fn save(&mut self) -> Result<()>;
    /// Re-applies the most recently saved changes.
    fn restore(&mut self, mode: RestoreMode) -> Result<()>;
    /// Files that `save` leaves in place although they are not committed.
    fn untracked(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Whether this run saved uncommitted changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Snapshot {
    taken: bool,
}

impl Snapshot {
    pub fn taken(&self) -> bool {
        self.taken
    }
}

/// Inspects the tree without side effects. Any status output, or a failure
/// to obtain the status at all, counts as dirty.
pub fn is_clean(vcs: &dyn VersionControl) -> bool {
    match vcs.status() {
        Ok(output) => output.trim().is_empty(),
        Err(e) => {
            warn!("Could not read working tree status, treating it as dirty: {:#}", e);
            false
        }
    }
}

/// Saves uncommitted changes if there are any.
///
/// # Errors
///
/// - The save operation's own error if it fails.
/// - `ModpackError::InconsistentWorkingTree` if the tree is still dirty after
///   saving. Nothing is restored in that case: it is unknown whether the save
///   created a stash entry, and restoring could apply an unrelated one.
pub fn take_if_dirty(vcs: &mut dyn VersionControl) -> Result<Snapshot> {
    warn_untracked(vcs);
    if is_clean(vcs) {
        debug!("Working tree is clean, no snapshot needed.");
        return Ok(Snapshot { taken: false });
    }

    info!("Working tree has uncommitted changes, saving them.");
    vcs.save()?;

    if !is_clean(vcs) {
        error!("Working tree is still dirty after saving. Check the stash list for your changes.");
        anyhow::bail!(ModpackError::InconsistentWorkingTree);
    }
    Ok(Snapshot { taken: true })
}

/// Untracked files end up in the archive as they are on disk.
fn warn_untracked(vcs: &dyn VersionControl) {
    match vcs.untracked() {
        Ok(paths) if !paths.is_empty() => warn!(
            "{} untracked file(s) will be packaged as they are: {}",
            paths.len(),
            paths.join(", ")
        ),
        Ok(_) => {}
        Err(e) => debug!("Could not list untracked files: {:#}", e),
    }
}

/// Re-applies the changes recorded by `snapshot`. No-op when nothing was saved.
pub fn restore(vcs: &mut dyn VersionControl, snapshot: Snapshot, mode: RestoreMode) -> Result<()> {
    if !snapshot.taken {
        return Ok(());
    }
    info!("Restoring saved working tree changes ({:?}).", mode);
    vcs.restore(mode)
}

/// Scoped ownership of a snapshot. Restores on `release` or on drop.
pub struct SnapshotGuard<'a> {
    vcs: &'a mut dyn VersionControl,
    snapshot: Snapshot,
    mode: RestoreMode,
    released: bool,
}

impl<'a> SnapshotGuard<'a> {
    /// Calls `take_if_dirty` and guards the result.
    pub fn take(vcs: &'a mut dyn VersionControl, mode: RestoreMode) -> Result<Self> {
        let snapshot = take_if_dirty(vcs)?;
        Ok(Self {
            vcs,
            snapshot,
            mode,
            released: false,
        })
    }

    pub fn taken(&self) -> bool {
        self.snapshot.taken()
    }

    /// Restores now and reports the outcome.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        restore(self.vcs, self.snapshot, self.mode)
    }
}

impl Drop for SnapshotGuard<'_> {
    fn drop(&mut self) {
        if self.released || !self.snapshot.taken {
            return;
        }
        warn!("Run ended early, restoring saved working tree changes.");
        if let Err(e) = restore(self.vcs, self.snapshot, self.mode) {
            error!(
                "Failed to restore saved changes: {:#}. They are still in the stash.",
                e
            );
        }
    }
}
