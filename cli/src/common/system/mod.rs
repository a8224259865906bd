//! # Modpack System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Host platform detection and the table of default destination directories.
//! The platform is used for nothing else.
//!
//! | Platform | Default destination                            |
//! |----------|------------------------------------------------|
//! | Windows  | `$APPDATA/Factorio/mods`                       |
//! | Linux    | `~/.factorio/mods`                             |
//! | macOS    | `~/Library/Application Support/factorio/mods`  |
//! | other    | none (the current directory is used)           |
//!
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Unexpanded default destination pattern, if the platform has one.
    pub fn default_dir_pattern(self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("$APPDATA/Factorio/mods"),
            Platform::Linux => Some("~/.factorio/mods"),
            Platform::MacOs => Some("~/Library/Application Support/factorio/mods"),
            Platform::Other => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Other => "unknown platform",
        };
        f.write_str(name)
    }
}

/// Default destination for `platform`, expanded against the real
/// environment and home directory. `None` when the platform has no default
/// or expansion fails.
pub fn default_output_dir(platform: Platform) -> Option<PathBuf> {
    expand_default_dir(platform, dirs::home_dir, |var| std::env::var(var).ok())
}

/// `default_output_dir` with injectable home and environment lookups.
pub fn expand_default_dir<H, E>(platform: Platform, home: H, env: E) -> Option<PathBuf>
where
    H: FnOnce() -> Option<PathBuf>,
    E: Fn(&str) -> Option<String>,
{
    let pattern = platform.default_dir_pattern()?;
    // shellexpand works on `str`; a home directory that is not valid UTF-8
    // is treated as unknown.
    let home_str = move || home().and_then(|h| h.into_os_string().into_string().ok());
    let expanded = shellexpand::full_with_context(pattern, home_str, |var: &str| {
        env(var).map(Some).ok_or(std::env::VarError::NotPresent)
    });
    match expanded {
        Ok(path) if !path.starts_with('~') => Some(PathBuf::from(path.into_owned())),
        Ok(path) => {
            debug!("No home directory to expand '{}'", path);
            None
        }
        Err(e) => {
            debug!("Could not expand default directory '{}': {}", pattern, e);
            None
        }
    }
}
