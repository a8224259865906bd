//! # Modpack Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Filesystem concerns of a packaging run, outside of the archive itself:
//!
//! - **`destination`**: chooses and validates the output directory (explicit
//!   path, platform default, or the current directory).
//! - **`io`**: file reads and removals with path context on errors.
//! - **`prune`**: deletes earlier archives of the same project from the
//!   destination.
//!
//! ```rust
//! use crate::common::fs::{destination, prune};
//! use std::path::Path;
//!
//! # fn run_example() -> crate::core::error::Result<()> {
//! let dest = destination::resolve(Some(Path::new("./out")), None, Path::new("."))?;
//! let removed = prune::prune(dest.as_path(), "train_whistle")?;
//! # Ok(())
//! # }
//! ```
//!

/// Output directory resolution and validation.
pub mod destination;
/// Basic file I/O with contextual errors.
pub mod io;
/// Removal of previously built archives.
pub mod prune;
