//! flup - Flutter SDK release resolver and installer
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Resolves a version specifier and channel against the published release
//! catalog, then installs the matching SDK archive into a tool cache.
//!
//! # Directory Layout
//!
//! ```text
//! $RUNNER_TOOL_CACHE (or ~/.flup/cache)/
//! └── flutter/
//!     └── 2.0.5-stable/
//!         ├── x64/           # SDK root
//!         └── x64.complete   # written once the copy finished
//! ```

pub mod cmd;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use flup_core::settings::DEFAULT_STORAGE_BASE;
use flup_schema::Platform;

#[derive(Debug, Parser)]
#[command(name = "flup")]
#[command(author, version = env!("FLUP_VERSION"), about = "flup - Flutter SDK installer")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the release storage
    #[arg(
        long,
        global = true,
        env = "FLUP_STORAGE_BASE",
        default_value = DEFAULT_STORAGE_BASE
    )]
    pub storage_base: String,

    /// Platform whose catalog is used (linux, macos, windows)
    #[arg(long, global = true)]
    pub platform: Option<Platform>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a Flutter SDK into the tool cache
    Install {
        #[command(flatten)]
        request: RequestArgs,
        /// Show what would be installed without downloading
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the release a request resolves to
    Resolve {
        #[command(flatten)]
        request: RequestArgs,
        /// Print the release as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Where the requested version comes from.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Version specifier: exact (2.0.5), prefix (2.0.x) or short (2.0).
    /// Omit for the channel's current release.
    pub version: Option<String>,

    /// Release channel: stable, beta, dev, master or any
    #[arg(long, default_value = cmd::DEFAULT_CHANNEL)]
    pub channel: String,

    /// Read the version from .fvm/flutter_config.json
    #[arg(long, conflicts_with = "from_pubspec")]
    pub from_fvm: bool,

    /// Read the version from pubspec.yaml (environment.flutter)
    #[arg(long)]
    pub from_pubspec: bool,

    /// Project directory holding the version files
    #[arg(long, default_value = ".")]
    pub project: PathBuf,
}
