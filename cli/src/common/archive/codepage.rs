//! # Entry Name Encoding (`common::archive::codepage`)
//!
//! File: cli/src/common/archive/codepage.rs
//! Author: Christi Mahu
//!
//! ZIP entry names without the UTF-8 flag are IBM code page 437, and that is
//! what the game's loader expects. A path that cannot be expressed in CP437
//! is a hard failure for the whole build: characters are never dropped or
//! substituted.
//!
use crate::core::error::{ModpackError, Result};
use codepage_437::CP437_CONTROL;
use std::path::Path;

/// Encodes `value` as CP437 bytes.
///
/// # Errors
///
/// `ModpackError::Encoding` naming `value` and its first unrepresentable
/// character.
pub fn encode(value: &str) -> Result<Vec<u8>> {
    value
        .chars()
        .map(|c| {
            encode_char(c).ok_or_else(|| {
                ModpackError::Encoding {
                    path: value.to_string(),
                    character: c,
                }
                .into()
            })
        })
        .collect()
}

/// True if `c` has a CP437 code point.
pub fn is_representable(c: char) -> bool {
    encode_char(c).is_some()
}

/// The CP437 byte for `c`, accepted only if it decodes back to `c`. The
/// dialect also maps look-alikes (`€` to the byte for `ε`), which would
/// silently change the name.
fn encode_char(c: char) -> Option<u8> {
    CP437_CONTROL
        .encode(c)
        .filter(|&byte| CP437_CONTROL.decode(byte) == c)
}

/// Checks a relative path component by component and returns it joined with
/// `/`, the ZIP separator.
///
/// Components that are not valid Unicode fail the same way as
/// unrepresentable characters.
pub fn archive_path(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let os = component.as_os_str();
        let part = os.to_str().ok_or_else(|| ModpackError::Encoding {
            path: relative.to_string_lossy().into_owned(),
            character: char::REPLACEMENT_CHARACTER,
        })?;
        parts.push(part);
    }
    let joined = parts.join("/");
    encode(&joined)?;
    Ok(joined)
}
