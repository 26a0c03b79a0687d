//! Tool cache
//!
//! Layout: `<root>/<tool>/<version>/<arch>/` with a sibling `<arch>.complete`
//! marker written only once the directory is fully populated.

use std::fs;
use std::path::{Path, PathBuf};

use flup_schema::Arch;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to copy into cache: {0}")]
    Copy(#[from] fs_extra::error::Error),
}

/// A directory-backed cache of extracted tools.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a cached tool lives in, whether or not it exists yet.
    pub fn tool_dir(&self, tool: &str, version: &str, arch: Arch) -> PathBuf {
        self.root.join(tool).join(version).join(arch.as_str())
    }

    fn marker(&self, tool: &str, version: &str, arch: Arch) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(format!("{}.complete", arch.as_str()))
    }

    /// Look up a completed cache entry.
    pub fn find(&self, tool: &str, version: &str, arch: Arch) -> Option<PathBuf> {
        let dir = self.tool_dir(tool, version, arch);
        if self.marker(tool, version, arch).is_file() && dir.is_dir() {
            debug!("Cache hit for {tool}@{version} ({arch}) at {}", dir.display());
            Some(dir)
        } else {
            debug!("Cache miss for {tool}@{version} ({arch})");
            None
        }
    }

    /// Copy the contents of `source` into the cache and mark the entry complete.
    ///
    /// Any partial entry left by an earlier interrupted run is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy or the marker write fails.
    pub fn cache_dir(
        &self,
        source: &Path,
        tool: &str,
        version: &str,
        arch: Arch,
    ) -> Result<PathBuf, CacheError> {
        let dest = self.tool_dir(tool, version, arch);
        let marker = self.marker(tool, version, arch);

        if marker.exists() {
            fs::remove_file(&marker)?;
        }
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        fs::create_dir_all(&dest)?;

        let options = fs_extra::dir::CopyOptions::new().content_only(true);
        fs_extra::dir::copy(source, &dest, &options)?;

        fs::write(&marker, b"")?;
        debug!("Cached {tool}@{version} ({arch}) at {}", dest.display());

        Ok(dest)
    }
}
