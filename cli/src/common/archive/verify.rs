//! # Archive Verification (`common::archive::verify`)
//!
//! File: cli/src/common/archive/verify.rs
//! Author: Christi Mahu
//!
//! The equivalent of `unzip -t`: reopen an archive, read every entry to the
//! end so the `zip` crate checks its CRC-32, and report the first failure.
//!
use crate::core::error::{ModpackError, Result};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Verifies every entry of the archive at `path` and returns the entry count.
///
/// # Errors
///
/// `ModpackError::Integrity` naming the archive and the failing entry (or
/// `<central directory>` if the archive cannot be opened as a ZIP at all).
pub fn verify_archive(path: &Path) -> Result<usize> {
    let file = File::open(path).map_err(|e| integrity(path, "<file>", e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| integrity(path, "<central directory>", e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| integrity(path, &format!("#{}", index), e))?;
        let name = entry.name().to_string();
        io::copy(&mut entry, &mut io::sink()).map_err(|e| integrity(path, &name, e))?;
        debug!("Verified entry {}", name);
    }
    Ok(archive.len())
}

fn integrity(archive: &Path, entry: &str, reason: impl Display) -> ModpackError {
    ModpackError::Integrity {
        archive: archive.to_path_buf(),
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const PAYLOAD: &[u8] = b"whistle sound definition, stored uncompressed";

    fn write_stored_zip(path: &Path) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("data.lua", options).unwrap();
        writer.write_all(PAYLOAD).unwrap();
        writer.start_file("control.lua", options).unwrap();
        writer.write_all(b"-- control").unwrap();
        writer.finish().unwrap();
    }

    fn assert_integrity_error(err: anyhow::Error, expected_entry: &str) {
        match err.downcast_ref::<ModpackError>() {
            Some(ModpackError::Integrity { entry, .. }) => assert_eq!(entry, expected_entry),
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_archive() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ok.zip");
        write_stored_zip(&path);
        assert_eq!(verify_archive(&path)?, 2);
        Ok(())
    }

    #[test]
    fn test_corrupted_entry_is_named() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("corrupt.zip");
        write_stored_zip(&path);

        let mut bytes = fs::read(&path)?;
        let offset = bytes
            .windows(PAYLOAD.len())
            .position(|w| w == PAYLOAD)
            .expect("payload stored verbatim");
        bytes[offset] ^= 0xFF;
        fs::write(&path, bytes)?;

        assert_integrity_error(verify_archive(&path).unwrap_err(), "data.lua");
        Ok(())
    }

    #[test]
    fn test_not_a_zip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("garbage.zip");
        fs::write(&path, b"this is not an archive")?;
        assert_integrity_error(verify_archive(&path).unwrap_err(), "<central directory>");
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = verify_archive(&dir.path().join("absent.zip")).unwrap_err();
        assert_integrity_error(err, "<file>");
    }
}
