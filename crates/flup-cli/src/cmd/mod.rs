//! Subcommands

pub mod install;
pub mod resolve;

use anyhow::{Result, bail};
use tracing::debug;

use crate::{Cli, RequestArgs};
use flup_core::settings::Settings;
use flup_core::version_file::{self, VersionRequest};
use flup_schema::{Arch, Platform};

/// Channel used when none is given.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Settings shared by every subcommand, resolved once from flags and environment.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub platform: Platform,
    pub arch: Arch,
}

impl Context {
    pub fn new(cli: &Cli) -> Self {
        let platform = cli.platform.unwrap_or_else(Platform::current);
        let mut settings = Settings::from_env(platform);
        settings.storage_base.clone_from(&cli.storage_base);
        debug!("Using {settings:?} for {platform}");

        Self {
            settings,
            platform,
            arch: Arch::current(),
        }
    }
}

/// Turn the request flags into a version/channel pair, reading a project
/// version file when asked to.
pub fn version_request(args: &RequestArgs) -> Result<VersionRequest> {
    let explicit_version = args.version.clone().unwrap_or_default();
    let from_file = args.from_fvm || args.from_pubspec;

    if from_file && (!explicit_version.is_empty() || args.channel != DEFAULT_CHANNEL) {
        bail!("using a version file together with a version or --channel is not supported");
    }

    let request = if args.from_fvm {
        version_file::read_fvm(&args.project)?
    } else if args.from_pubspec {
        version_file::read_pubspec(&args.project)?
    } else {
        VersionRequest {
            version: explicit_version,
            channel: args.channel.clone(),
        }
    };

    debug!(
        "Requested version '{}' on channel {}",
        request.version, request.channel
    );
    Ok(request)
}
