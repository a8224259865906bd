//! # Modpack CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test gets
//! its own temporary workspace with a mod project, a mods directory and a
//! working directory, and an empty configuration file so the user's real
//! configuration never leaks into a test run.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create an `assert_cmd::Command` for the compiled `modpack` binary.
///
/// ## Panics
/// Panics if the `modpack` binary cannot be found via `Command::cargo_bin`.
pub fn modpack_cmd() -> Command {
    Command::cargo_bin("modpack").expect("Failed to find modpack binary for testing")
}

/// Temporary layout for one test.
pub struct Workspace {
    pub root: TempDir,
    pub project: PathBuf,
    pub mods: PathBuf,
    pub cwd: PathBuf,
    pub config: PathBuf,
}

impl Workspace {
    /// Creates a project named `whistle` at version 1.2.0 with two files.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let project = root.path().join("whistle");
        let mods = root.path().join("mods");
        let cwd = root.path().join("cwd");
        for dir in [&project, &mods, &cwd] {
            fs::create_dir_all(dir).expect("create workspace dir");
        }
        let config = root.path().join("modpack.toml");
        fs::write(&config, "").expect("write empty config");

        write(&project, "info.json", r#"{"name": "whistle", "version": "1.2.0", "title": "Whistle"}"#);
        write(&project, "control.lua", "script.on_init(function() end)\n");
        write(&project, "locale/en/whistle.cfg", "[mod-name]\nwhistle=Whistle\n");

        Self {
            root,
            project,
            mods,
            cwd,
            config,
        }
    }

    /// `modpack` running in `cwd` against this project with the empty config.
    pub fn cmd(&self) -> Command {
        let mut cmd = modpack_cmd();
        cmd.current_dir(&self.cwd)
            .env_remove("MODPACK_CONFIG")
            .arg("--config")
            .arg(&self.config)
            .arg("-C")
            .arg(&self.project);
        cmd
    }
}

/// Writes `contents` to `dir/relative`, creating parent directories.
pub fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Sorted entry names of the archive at `path`.
pub fn entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let archive = zip::ZipArchive::new(file).expect("read archive");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Sorted `.zip` file names in `dir`.
pub fn zips_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".zip"))
        .collect();
    names.sort();
    names
}
