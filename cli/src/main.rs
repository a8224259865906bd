//! # Modpack Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Entry point for the `modpack` CLI, which packages a mod project into a
//! versioned ZIP archive for the game to load. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Handing off to the package command and reporting its errors
//!
//! ## Examples
//!
//! ```bash
//! # Package the project in the current directory
//! modpack
//!
//! # Same, with debug logging
//! modpack -vv
//! ```
//!
//! Processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Run the package command
//! 4. Print any error with its full context chain and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers
mod common; // Shared building blocks (archive, fs, vcs, ...)
mod core; // Errors, configuration, descriptor

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "modpack",
    about = "Package a mod project into <name>_<version>.zip",
    long_about = "Builds a versioned ZIP archive from the committed state of a mod project.\n\
                  Uncommitted changes are stashed for the build and restored afterwards.",
    version
)]
struct Cli {
    #[command(flatten)]
    package: commands::package::PackageArgs,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = commands::package::handle_package(cli.package) {
        tracing::error!("Packaging failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
