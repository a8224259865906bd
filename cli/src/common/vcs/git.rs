//! # Git Working Tree (`common::vcs::git`)
//!
//! File: cli/src/common/vcs/git.rs
//! Author: Christi Mahu
//!
//! `VersionControl` over the `git` binary:
//! - status: `git status --porcelain` (empty when clean)
//! - save: `git stash push`
//! - restore: `git stash pop` or `git stash apply`
//!
//! Untracked files are ignored by default, matching a plain `git stash`.
//! With `include_untracked` they count as changes and are stashed too.
//!
//! Every command is limited to the whole repository minus `*.zip` files, so
//! an archive written inside the project is never stashed or counted as a
//! change.
//!
use super::{RestoreMode, VersionControl};
use crate::common::process;
use crate::core::error::{ModpackError, Result};
use std::path::PathBuf;

const GIT: &str = "git";

/// Whole repository, any `*.zip` at any depth excluded.
const PATHSPEC: [&str; 2] = [":/", ":(top,exclude)*.zip"];

/// Git working tree rooted at (or containing) `root`.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    include_untracked: bool,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, include_untracked: bool) -> Self {
        Self {
            root: root.into(),
            include_untracked,
        }
    }

    fn run(&self, operation: &str, args: &[&str]) -> Result<String> {
        let output = process::run_command_checked(GIT, args, Some(&self.root)).map_err(|e| {
            ModpackError::VersionControl {
                operation: operation.to_string(),
                detail: format!("{:#}", e),
            }
        })?;
        Ok(output.combined())
    }
}

impl VersionControl for GitCli {
    fn status(&self) -> Result<String> {
        let untracked = if self.include_untracked {
            "--untracked-files=normal"
        } else {
            "--untracked-files=no"
        };
        let mut args = vec!["status", "--porcelain", untracked, "--"];
        args.extend(PATHSPEC);
        let output = process::run_command_capture(GIT, &args, Some(&self.root))?;
        // Outside a repository git prints to stderr and exits non-zero; the
        // combined text is non-empty either way, so the tree reads as dirty.
        Ok(output.combined())
    }

    fn save(&mut self) -> Result<()> {
        let mut args = vec!["stash", "push", "--message", "modpack: packaging snapshot"];
        if self.include_untracked {
            args.push("--include-untracked");
        }
        args.push("--");
        args.extend(PATHSPEC);
        self.run("stash save", &args).map(|_| ())
    }

    fn untracked(&self) -> Result<Vec<String>> {
        if self.include_untracked {
            return Ok(Vec::new());
        }
        let mut args = vec!["ls-files", "--others", "--exclude-standard", "--full-name", "--"];
        args.extend(PATHSPEC);
        let listing = self.run("list untracked files", &args)?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn restore(&mut self, mode: RestoreMode) -> Result<()> {
        let sub = match mode {
            RestoreMode::Pop => "pop",
            RestoreMode::Apply => "apply",
        };
        self.run(&format!("stash {}", sub), &["stash", sub]).map(|_| ())
    }
}
