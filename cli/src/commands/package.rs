//! # Package Command (`commands::package`)
//!
//! File: cli/src/commands/package.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The one thing `modpack` does: turn the committed state of a mod project
//! into `<name>_<version>.zip` in the game's mods directory.
//!
//! ## Architecture
//!
//! `handle_package` resolves a `PackagePlan` from flags and configuration,
//! then hands it to `run`, which only talks to the filesystem and to a
//! `VersionControl` implementation. Tests drive `run` with an in-memory
//! working tree.
//!
//! Run flow:
//! 1. Read the descriptor once. A bad descriptor stops the run before
//!    anything is stashed or written.
//! 2. Save uncommitted changes (if any) under a `SnapshotGuard`.
//! 3. Re-read the descriptor from the committed tree.
//! 4. Resolve the destination, falling back to the current directory.
//! 5. Remove older archives of the same project.
//! 6. Build and verify the archive.
//! 7. Restore the saved changes.
//!
//! ## Examples
//!
//! ```bash
//! # Package into the platform's mods directory
//! modpack
//!
//! # Package into ./dist, keeping older builds
//! modpack -o dist --keep-old
//!
//! # Show where archives would go
//! modpack --detect
//! ```
//!
use crate::{
    common::{
        archive::{self, ArchiveLayout, ArchiveOptions, ArchiveReport, ExclusionRules},
        fs::{destination, prune},
        system::{self, Platform},
        vcs::{git::GitCli, RestoreMode, SnapshotGuard, VersionControl},
    },
    core::{
        config::{self, Config},
        error::{ModpackError, Result},
        metadata,
    },
};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Arguments for a packaging run.
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Destination directory (defaults to the game's mods directory).
    #[arg(short, long, value_name = "DIR", conflicts_with = "here")]
    pub output: Option<PathBuf>,

    /// Write into the current directory. Older archives are kept.
    #[arg(long)]
    pub here: bool,

    /// Print the default destination for this platform and exit.
    #[arg(long)]
    pub detect: bool,

    /// Keep previously built archives of this project.
    #[arg(short, long)]
    pub keep_old: bool,

    /// Project root to package.
    #[arg(short = 'C', long = "project", value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Descriptor file, relative to the project root (default: info.json).
    #[arg(long, value_name = "FILE")]
    pub descriptor: Option<PathBuf>,

    /// Archive layout: entries at the root, or under a `<name>_<version>/` folder.
    #[arg(long, value_enum)]
    pub layout: Option<ArchiveLayout>,

    /// How stashed changes are re-applied after packaging.
    #[arg(long, value_enum)]
    pub restore: Option<RestoreMode>,

    /// Do not inspect or stash the working tree.
    #[arg(long)]
    pub no_vcs: bool,

    /// Configuration file to use instead of the user and project files.
    #[arg(long, value_name = "FILE", env = "MODPACK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Where the archive should go, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationChoice {
    /// `--output` or `output.directory`.
    Explicit(PathBuf),
    /// `--here`.
    CurrentDir,
    /// The platform table entry, or the current directory without one.
    PlatformDefault,
}

/// Snapshot settings for a run with version control enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsSettings {
    pub restore: RestoreMode,
    pub include_untracked: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub project_root: PathBuf,
    pub descriptor: PathBuf,
    pub destination: DestinationChoice,
    pub platform_default: Option<PathBuf>,
    pub current_dir: PathBuf,
    pub keep_old_versions: bool,
    pub archive: ArchiveOptions,
    pub vcs: Option<VcsSettings>,
}

impl PackagePlan {
    /// Layers flags over configuration. `current_dir` and `platform_default`
    /// describe the host.
    pub fn resolve(
        args: &PackageArgs,
        config: &Config,
        current_dir: PathBuf,
        platform_default: Option<PathBuf>,
    ) -> Result<Self> {
        let descriptor = args
            .descriptor
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.package.descriptor));

        let destination = if args.here {
            DestinationChoice::CurrentDir
        } else if let Some(output) = &args.output {
            DestinationChoice::Explicit(output.clone())
        } else if let Some(directory) = &config.output.directory {
            DestinationChoice::Explicit(PathBuf::from(directory))
        } else {
            DestinationChoice::PlatformDefault
        };

        let vcs = if args.no_vcs || !config.vcs.enabled {
            None
        } else {
            Some(VcsSettings {
                restore: args.restore.unwrap_or(config.vcs.restore),
                include_untracked: config.vcs.include_untracked,
            })
        };

        Ok(Self {
            descriptor: args.project.join(descriptor),
            project_root: args.project.clone(),
            destination,
            platform_default,
            current_dir,
            keep_old_versions: args.keep_old || args.here || config.output.keep_old_versions,
            archive: ArchiveOptions {
                layout: args.layout.unwrap_or(config.package.layout),
                exclusions: ExclusionRules::with_extra(&config.archive.exclude)?,
            },
            vcs,
        })
    }
}

/// Handles a `modpack` invocation.
pub fn handle_package(args: PackageArgs) -> Result<()> {
    if args.detect {
        let platform = Platform::current();
        println!("{}", describe_default(platform, system::default_output_dir(platform).as_deref()));
        return Ok(());
    }

    if !args.project.is_dir() {
        anyhow::bail!(ModpackError::Config(format!(
            "Project directory not found: {}",
            args.project.display()
        )));
    }

    let config = config::load_config(&args.project, args.config.as_deref())?;
    let current_dir = std::env::current_dir().context("Failed to determine the current directory")?;
    let plan = PackagePlan::resolve(
        &args,
        &config,
        current_dir,
        system::default_output_dir(Platform::current()),
    )?;
    debug!("Package plan: {:?}", plan);
    debug!(
        "Excluding: {}",
        plan.archive.exclusions.patterns().collect::<Vec<_>>().join(", ")
    );

    let report = match plan.vcs {
        Some(settings) => {
            let mut git = GitCli::new(&plan.project_root, settings.include_untracked);
            run(&plan, Some(&mut git as &mut dyn VersionControl))?
        }
        None => run(&plan, None)?,
    };

    println!("Archive written to {}", report.path.display());
    Ok(())
}

/// Executes a resolved plan.
///
/// With `vcs` set, uncommitted changes are saved before the build and
/// restored afterwards on every path. A build error is reported in
/// preference to a restore error; the restore error is still logged.
pub fn run(plan: &PackagePlan, vcs: Option<&mut dyn VersionControl>) -> Result<ArchiveReport> {
    if let Err(e) = metadata::read(&plan.descriptor) {
        if e.downcast_ref::<ModpackError>().is_some_and(ModpackError::is_descriptor) {
            info!(
                "{} is unusable; nothing was stashed or written",
                plan.descriptor.display()
            );
        }
        return Err(e);
    }

    let Some(vcs) = vcs else {
        return build_committed(plan);
    };

    let restore_mode = plan.vcs.map(|s| s.restore).unwrap_or_default();
    let guard = SnapshotGuard::take(vcs, restore_mode)?;
    if guard.taken() {
        println!("Stashed uncommitted changes; packaging the last commit.");
    }

    let built = build_committed(plan);
    let restored = guard.release();

    match (built, restored) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(report), Err(e)) => Err(e.context(format!(
            "{} was written, but restoring your uncommitted changes failed; they are still in the stash",
            report.path.display()
        ))),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            error!(
                "Restoring uncommitted changes also failed: {:#}. They are still in the stash.",
                restore_err
            );
            Err(e)
        }
    }
}

fn build_committed(plan: &PackagePlan) -> Result<ArchiveReport> {
    let metadata = metadata::read(&plan.descriptor)?;
    info!("Packaging {} {}", metadata.name, metadata.version);

    let (destination, prune_allowed) = choose_destination(plan)?;

    if prune_allowed && !plan.keep_old_versions {
        let removed = prune::prune(destination.as_path(), &metadata.name)?;
        for path in &removed {
            println!("Removed old version {}", path.display());
        }
    } else {
        debug!("Keeping existing archives in {}", destination.as_path().display());
    }

    archive::zip::build_archive(
        &plan.project_root,
        &metadata.archive_name(),
        destination.as_path(),
        &plan.archive,
    )
}

/// Returns the destination and whether pruning may touch it.
fn choose_destination(plan: &PackagePlan) -> Result<(destination::DestinationPath, bool)> {
    let resolved = match &plan.destination {
        DestinationChoice::CurrentDir => {
            return Ok((destination::resolve(Some(&plan.current_dir), None, &plan.current_dir)?, false));
        }
        DestinationChoice::Explicit(path) => destination::resolve(Some(path), None, &plan.current_dir),
        DestinationChoice::PlatformDefault => {
            destination::resolve(None, plan.platform_default.clone(), &plan.current_dir)
        }
    };

    match resolved {
        Ok(dest) => Ok((dest, true)),
        Err(e)
            if e
                .downcast_ref::<ModpackError>()
                .is_some_and(ModpackError::is_destination) =>
        {
            warn!("{}; falling back to the current directory", e);
            eprintln!(
                "Warning: {}. Writing to {} instead and keeping old versions.",
                e,
                plan.current_dir.display()
            );
            let fallback = destination::resolve(Some(&plan.current_dir), None, &plan.current_dir)?;
            Ok((fallback, false))
        }
        Err(e) => Err(e),
    }
}

/// Text printed by `--detect`.
fn describe_default(platform: Platform, default: Option<&Path>) -> String {
    match default {
        Some(path) => format!(
            "Default output directory ({}): {} ({})",
            platform,
            path.display(),
            if path.is_dir() { "exists" } else { "missing" }
        ),
        None => format!(
            "No default output directory on {}; archives are written to the current directory.",
            platform
        ),
    }
}
