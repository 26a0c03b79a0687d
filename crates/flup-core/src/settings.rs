//! Runtime configuration, resolved once at startup and passed explicitly.

use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use flup_schema::Platform;

/// Default location of release catalogs and archives.
pub const DEFAULT_STORAGE_BASE: &str =
    "https://storage.googleapis.com/flutter_infra_release/releases";

/// Default timeout for catalog and archive requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything the installer needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL for `releases_<platform>.json` and archives
    pub storage_base: String,
    /// Root of the tool cache
    pub tool_cache: PathBuf,
    /// Scratch space for downloads and extraction
    pub temp_dir: PathBuf,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env(platform: Platform) -> Self {
        Self::from_lookup(platform, |key| std::env::var(key).ok())
    }

    /// Load settings using `lookup` for environment variables.
    ///
    /// - `FLUP_STORAGE_BASE`: storage base URL
    /// - `RUNNER_TOOL_CACHE`: tool cache root, else `$FLUP_HOME/cache`
    /// - `RUNNER_TEMP`: temp root, else a per-platform default
    /// - `FLUP_HTTP_TIMEOUT`: request timeout in seconds
    pub fn from_lookup<F>(platform: Platform, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let storage_base =
            non_empty("FLUP_STORAGE_BASE").unwrap_or_else(|| DEFAULT_STORAGE_BASE.to_string());

        let tool_cache = non_empty("RUNNER_TOOL_CACHE").map_or_else(
            || flup_home(non_empty("FLUP_HOME")).join("cache"),
            PathBuf::from,
        );

        let temp_dir = non_empty("RUNNER_TEMP").map_or_else(
            || default_temp_dir(platform, non_empty("USERPROFILE")),
            PathBuf::from,
        );

        let http_timeout = non_empty("FLUP_HTTP_TIMEOUT")
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs);

        Self {
            storage_base,
            tool_cache,
            temp_dir,
            http_timeout,
        }
    }

    /// Build the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(self.http_timeout)
            .build()
    }
}

/// Returns the flup home directory: `FLUP_HOME` if set, else `~/.flup`.
///
/// Falls back to a relative `.flup` if the home directory cannot be resolved.
fn flup_home(override_dir: Option<String>) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    home_dir().map_or_else(|| PathBuf::from(".flup"), |h| h.join(".flup"))
}

/// Scratch directory used when `RUNNER_TEMP` is not provided.
fn default_temp_dir(platform: Platform, user_profile: Option<String>) -> PathBuf {
    let base = match platform {
        Platform::Windows => PathBuf::from(user_profile.unwrap_or_else(|| "C:\\".to_string())),
        Platform::Macos => PathBuf::from("/Users"),
        Platform::Linux => PathBuf::from("/home"),
    };
    base.join("actions").join("temp")
}
