//! Install flow: resolve, check the tool cache, download, extract, cache.

use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheError, ToolCache};
use crate::catalog::CatalogClient;
use crate::channel::MASTER_CHANNEL;
use crate::error::ResolveError;
use crate::io::download::{DownloadError, download_to};
use crate::io::extract::{ExtractError, extract_archive};
use crate::resolver::{ResolvedRelease, Resolver};
use crate::settings::Settings;
use flup_schema::{Arch, Platform};

/// Name of the tool inside the tool cache.
pub const TOOL_NAME: &str = "flutter";

/// Channel the master channel is bootstrapped from.
const MASTER_BOOTSTRAP_CHANNEL: &str = "dev";

#[derive(Error, Debug)]
pub enum InstallError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` failed: {status}")]
    Command { command: String, status: String },

    #[error("{0}")]
    Unsupported(String),
}

/// Cache key for a resolved version requested on `channel`.
///
/// `master` is always cached under its own name; everything else is keyed
/// by version and the requested channel, with `+` folded to `-`.
pub fn cache_key(version: &str, channel: &str) -> String {
    if channel == MASTER_CHANNEL {
        MASTER_CHANNEL.to_string()
    } else {
        format!("{}-{}", version.replace('+', "-"), channel)
    }
}

/// Outcome of an install.
#[derive(Debug, Clone)]
pub struct Installation {
    /// Root of the SDK inside the tool cache
    pub sdk_root: PathBuf,
    /// Release that was selected
    pub release: ResolvedRelease,
    /// Key the SDK is cached under
    pub cache_key: String,
    /// Whether the SDK was already cached
    pub cached: bool,
}

/// Installs SDK releases into the tool cache.
#[derive(Debug, Clone)]
pub struct Installer {
    client: Client,
    resolver: Resolver,
    cache: ToolCache,
    temp_dir: PathBuf,
    platform: Platform,
    arch: Arch,
}

impl Installer {
    /// Create an installer from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: &Settings, platform: Platform, arch: Arch) -> Result<Self, InstallError> {
        let client = settings.http_client().map_err(DownloadError::from)?;
        let catalogs = CatalogClient::new(client.clone(), settings.storage_base.clone());

        Ok(Self {
            client,
            resolver: Resolver::new(catalogs),
            cache: ToolCache::new(settings.tool_cache.clone()),
            temp_dir: settings.temp_dir.clone(),
            platform,
            arch,
        })
    }

    /// Resolve the release an install of `version` on `channel` would use.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported combinations or resolution failures.
    pub async fn resolve(&self, version: &str, channel: &str) -> Result<ResolvedRelease, InstallError> {
        let use_master = channel == MASTER_CHANNEL;
        if use_master && !version.is_empty() {
            return Err(InstallError::Unsupported(
                "using a version with the master channel is not supported".to_string(),
            ));
        }

        let lookup_channel = if use_master {
            MASTER_BOOTSTRAP_CHANNEL
        } else {
            channel
        };

        Ok(self
            .resolver
            .determine(version, lookup_channel, self.platform)
            .await?)
    }

    /// Install `version` from `channel`, reusing the tool cache when possible.
    ///
    /// For the `master` channel the latest `dev` release is installed and
    /// then switched to master with the SDK's own tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution, download, extraction, caching, or the
    /// master channel switch fails.
    pub async fn install(&self, version: &str, channel: &str) -> Result<Installation, InstallError> {
        let release = self.resolve(version, channel).await?;
        let key = cache_key(&release.version, channel);

        let (sdk_root, cached) = match self.cache.find(TOOL_NAME, &key, self.arch) {
            Some(path) => {
                info!("Tool found in cache {}", path.display());
                (path, true)
            }
            None => (self.download_and_cache(&release, &key).await?, false),
        };

        if channel == MASTER_CHANNEL {
            switch_to_master(&sdk_root).await?;
        }

        Ok(Installation {
            sdk_root,
            release,
            cache_key: key,
            cached,
        })
    }

    async fn download_and_cache(
        &self,
        release: &ResolvedRelease,
        key: &str,
    ) -> Result<PathBuf, InstallError> {
        info!("Downloading Flutter from {}", release.download_url);

        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("temp_")
            .tempdir_in(&self.temp_dir)?;

        let archive_name = release.archive_name();
        let archive_path = scratch.path().join(archive_name);
        download_to(&self.client, &release.download_url, &archive_path).await?;

        let extract_dir = scratch.path().join("sdk");
        let archive_for_blocking = archive_path.clone();
        let name_for_blocking = archive_name.to_string();
        let extract_for_blocking = extract_dir.clone();
        let sdk_dir = tokio::task::spawn_blocking(move || {
            extract_archive(
                &archive_for_blocking,
                &name_for_blocking,
                &extract_for_blocking,
            )
        })
        .await
        .map_err(std::io::Error::other)??;

        let cache = self.cache.clone();
        let key_owned = key.to_string();
        let arch = self.arch;
        let cached = tokio::task::spawn_blocking(move || {
            cache.cache_dir(&sdk_dir, TOOL_NAME, &key_owned, arch)
        })
        .await
        .map_err(std::io::Error::other)??;

        debug!("Removing scratch directory {}", scratch.path().display());
        Ok(cached)
    }
}

async fn switch_to_master(sdk_root: &Path) -> Result<(), InstallError> {
    let flutter = sdk_root.join("bin").join(if cfg!(windows) {
        "flutter.bat"
    } else {
        "flutter"
    });

    let steps: [&[&str]; 2] = [&["channel", MASTER_CHANNEL], &["upgrade"]];
    for args in steps {
        let command = format!("flutter {}", args.join(" "));
        info!("Running {command}");

        let status = tokio::process::Command::new(&flutter)
            .args(args)
            .status()
            .await?;

        if !status.success() {
            return Err(InstallError::Command {
                command,
                status: status.to_string(),
            });
        }
    }

    Ok(())
}
