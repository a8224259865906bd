//! # Modpack Commands (`commands`)
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! Command handlers. Each translates parsed arguments into calls on
//! `common::` and `core::`, and owns what gets printed to the user.
//!

/// Packaging run: snapshot, prune, build, verify, restore.
pub mod package;
