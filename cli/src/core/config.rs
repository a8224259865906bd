//! # Modpack Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements the configuration system for Modpack, handling
//! loading, merging, validation, and access to configuration data. It
//! combines defaults, user settings, and project-specific overrides; command
//! line flags are applied on top by the `package` command.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. An explicit file given with `--config` / `MODPACK_CONFIG` (replaces 2 and 3)
//! 2. Project-specific `.modpack.toml` in the project directory or ancestors
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [package]
//! descriptor = "info.json"
//! layout = "flat"
//!
//! [output]
//! directory = "~/games/mods"
//! keep_old_versions = false
//!
//! [vcs]
//! enabled = true
//! restore = "pop"
//!
//! [archive]
//! exclude = ["*.psd", "screenshots"]
//! ```
//!
use crate::common::archive::ArchiveLayout;
use crate::common::vcs::RestoreMode;
use crate::core::error::{ModpackError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub vcs: VcsConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Where the descriptor lives and how entries are laid out.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Descriptor path, relative to the project root.
    #[serde(default = "default_descriptor")]
    pub descriptor: String,
    /// Flat (default) or nested entry layout.
    #[serde(default)]
    pub layout: ArchiveLayout,
}

/// Destination settings.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Explicit destination directory (can use ~). Unset means the platform default.
    pub directory: Option<String>,
    /// Skip deleting previously built archives for the same project.
    #[serde(default)]
    pub keep_old_versions: bool,
}

/// Working-tree snapshot settings.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VcsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub restore: RestoreMode,
    /// Treat untracked files as dirty and stash them too.
    #[serde(default)]
    pub include_untracked: bool,
}

/// Extra exclusion patterns, added to the built-in ones.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            descriptor: default_descriptor(),
            layout: ArchiveLayout::default(),
        }
    }
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            restore: RestoreMode::default(),
            include_untracked: false,
        }
    }
}

fn default_descriptor() -> String {
    "info.json".to_string()
}
fn default_true() -> bool {
    true
}

pub const PROJECT_CONFIG_FILENAME: &str = ".modpack.toml";

/// Loads the effective configuration for a project.
///
/// With `explicit` set, only that file is read (it must exist). Otherwise the
/// user and project files are discovered and merged.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            let user_config = load_user_config()?;
            let project_config = load_project_config(project_root)?;
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    expand_config_paths(&mut config);
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Modpack", "modpack") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(project_root: &Path) -> Result<Option<Config>> {
    if let Some(project_config_path) = find_project_config_path(project_root) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found in {} or ancestors.",
            PROJECT_CONFIG_FILENAME,
            project_root.display()
        );
        Ok(None)
    }
}

/// Walks upwards from `start`, stopping at the first directory holding `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").exists() {
            debug!(
                "Found .git at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };
    let defaults = Config::default();
    Config {
        package: PackageConfig {
            descriptor: if project.package.descriptor != defaults.package.descriptor {
                project.package.descriptor
            } else {
                user.package.descriptor
            },
            layout: if project.package.layout != defaults.package.layout {
                project.package.layout
            } else {
                user.package.layout
            },
        },
        output: OutputConfig {
            directory: project.output.directory.or(user.output.directory),
            keep_old_versions: project.output.keep_old_versions || user.output.keep_old_versions,
        },
        vcs: VcsConfig {
            enabled: project.vcs.enabled && user.vcs.enabled,
            restore: if project.vcs.restore != defaults.vcs.restore {
                project.vcs.restore
            } else {
                user.vcs.restore
            },
            include_untracked: project.vcs.include_untracked || user.vcs.include_untracked,
        },
        archive: ArchiveConfig {
            exclude: if !project.archive.exclude.is_empty() {
                project.archive.exclude
            } else {
                user.archive.exclude
            },
        },
    }
}

fn expand_config_paths(config: &mut Config) {
    if let Some(dir) = config.output.directory.as_mut() {
        *dir = shellexpand::tilde(dir).into_owned();
        debug!("Expanded output directory: {}", dir);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if config.package.descriptor.trim().is_empty() {
        return Err(anyhow!(ModpackError::Config(
            "package.descriptor cannot be empty".to_string()
        )));
    }
    if config
        .output
        .directory
        .as_deref()
        .is_some_and(|d| d.trim().is_empty())
    {
        return Err(anyhow!(ModpackError::Config(
            "output.directory cannot be empty; remove it to use the platform default".to_string()
        )));
    }
    for pattern in &config.archive.exclude {
        glob::Pattern::new(pattern).map_err(|e| {
            anyhow!(ModpackError::Config(format!(
                "Invalid exclude pattern '{}': {}",
                pattern, e
            )))
        })?;
    }
    Ok(())
}
