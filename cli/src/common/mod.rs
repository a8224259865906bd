//! # Modpack Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared building blocks of a packaging run. Command handlers (`commands::`)
//! compose these; none of them knows about command-line flags.
//!
//! - **`archive`**: exclusion rules, code page checks, ZIP writing and verification.
//! - **`fs`**: destination resolution, stale-version pruning, file helpers.
//! - **`process`**: running external programs with captured output.
//! - **`system`**: host platform detection and default destinations.
//! - **`vcs`**: working-tree snapshots around the build (git stash).
//!

/// ZIP archive creation and verification.
pub mod archive;
/// Filesystem operations: destination, pruning, I/O helpers.
pub mod fs;
/// External process execution.
pub mod process;
/// Platform detection and default destination table.
pub mod system;
/// Version-control snapshot and restore.
pub mod vcs;
