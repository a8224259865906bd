//! # Modpack ZIP Archive Builder (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Builds `<destination>/<archive_name>.zip` from a project tree.
//!
//! ## Architecture
//!
//! 1. Walk the tree with `walkdir` (sorted, links not followed), pruning
//!    excluded names at every level.
//! 2. For each regular file, encode its project-relative path and its entry
//!    name as code page 437.
//! 3. Deflate each file into the archive under the encoded name
//!    (`writer::Cp437ZipWriter`).
//! 4. Reopen the finished archive and read back every entry (`verify`).
//! 5. If anything in 2-4 fails, delete the archive file so no partial or
//!    corrupt artifact is left behind, and return the error.
//!
//! The archive file is written in place. Only the file at the target path is
//! cleaned up; stale versions already pruned from the destination are not
//! restored.
//!
use super::writer::{Cp437ZipWriter, ZIP64_THRESHOLD};
use super::{codepage, verify, ArchiveOptions, ArchiveReport};
use crate::common::fs::io as fs_io;
use crate::core::error::{ModpackError, Result};
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Builds, verifies and returns the archive, or removes it on failure.
///
/// # Errors
///
/// - `ModpackError::Encoding` if a path is not representable in CP437.
/// - `ModpackError::Integrity` if verification fails.
/// - I/O and ZIP errors (with context) from traversal or writing.
///
/// In every case except failing to create the file in the first place, the
/// archive path no longer exists when the error is returned.
pub fn build_archive(
    source_root: &Path,
    archive_name: &str,
    destination: &Path,
    options: &ArchiveOptions,
) -> Result<ArchiveReport> {
    build_archive_with(
        source_root,
        archive_name,
        destination,
        options,
        verify::verify_archive,
    )
}

/// `build_archive` with the read-back step supplied by the caller.
///
/// `verify_written` receives the finished archive path and returns the
/// number of entries it found.
pub fn build_archive_with<V>(
    source_root: &Path,
    archive_name: &str,
    destination: &Path,
    options: &ArchiveOptions,
    verify_written: V,
) -> Result<ArchiveReport>
where
    V: FnOnce(&Path) -> Result<usize>,
{
    let archive_path = destination.join(format!("{}.zip", archive_name));
    info!(
        "Building {} from {} ({:?} layout)",
        archive_path.display(),
        source_root.display(),
        options.layout
    );

    let file = File::create(&archive_path)
        .with_context(|| format!("Failed to create archive {}", archive_path.display()))?;

    let outcome = write_entries(file, source_root, archive_name, options).and_then(|written| {
        let verified = verify_written(&archive_path)?;
        if verified != written {
            anyhow::bail!(ModpackError::Integrity {
                archive: archive_path.clone(),
                entry: "<central directory>".to_string(),
                reason: format!("expected {} entries, found {}", written, verified),
            });
        }
        Ok(written)
    });

    match outcome {
        Ok(entries) => {
            info!("Wrote {} entries to {}", entries, archive_path.display());
            Ok(ArchiveReport {
                path: archive_path,
                entries,
            })
        }
        Err(e) => {
            discard_partial(&archive_path);
            Err(e.context(format!("Failed to build archive {}", archive_path.display())))
        }
    }
}

fn write_entries(
    file: File,
    source_root: &Path,
    archive_name: &str,
    options: &ArchiveOptions,
) -> Result<usize> {
    let mut writer = Cp437ZipWriter::new(BufWriter::new(file));

    let walker = WalkDir::new(source_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !options.exclusions.is_excluded(entry.file_name())
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to traverse {}", source_root.display()))?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            warn!("Skipping non-regular file: {}", entry.path().display());
            continue;
        }

        let relative = entry.path().strip_prefix(source_root).with_context(|| {
            format!(
                "{} is outside {}",
                entry.path().display(),
                source_root.display()
            )
        })?;
        let source_name = codepage::archive_path(relative)?;
        let entry_name = options.layout.entry_name(archive_name, &source_name);
        let encoded_name = codepage::encode(&entry_name)?;

        let size = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", entry.path().display()))?
            .len();
        if size >= ZIP64_THRESHOLD {
            debug!("{} needs ZIP64 headers ({} bytes)", entry_name, size);
        }

        debug!("Adding {} as {}", entry.path().display(), entry_name);
        let mut source = File::open(entry.path())
            .with_context(|| format!("Failed to open {}", entry.path().display()))?;
        writer
            .add_entry(&encoded_name, size, &mut source)
            .with_context(|| {
                format!("Failed to write {} into the archive", entry.path().display())
            })?;
    }

    let written = writer.len();
    let mut buffered = writer.finish().context("Failed to finalize archive")?;
    buffered.flush().context("Failed to flush archive")?;
    let file = buffered
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush archive")?;
    file.sync_all().context("Failed to sync archive to disk")?;
    Ok(written)
}

/// Removes a partially written archive, logging rather than failing.
fn discard_partial(path: &Path) {
    match fs_io::remove_file_if_exists(path) {
        Ok(true) => warn!("Removed incomplete archive {}", path.display()),
        Ok(false) => {}
        Err(e) => error!("Could not remove incomplete archive {}: {:#}", path.display(), e),
    }
}
