//! Release catalog document (`releases_<platform>.json`).
//!
//! Two historical version formats coexist in published catalogs: legacy
//! tags carrying a leading `v` (`v1.7.11`) and plain semantic versions
//! (`1.17.0-dev.5.0`). Both are folded into [`ReleaseVersion`] when the
//! document is deserialized so that consumers only ever see one shape.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::LEGACY_MARKER;

/// A version string as published in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReleaseVersion {
    /// Legacy tag with the `v` marker, stored verbatim (e.g. `v1.7.11`).
    Legacy(String),
    /// Bare semantic version (e.g. `2.0.5`).
    Plain(String),
}

impl ReleaseVersion {
    /// The version exactly as published.
    pub fn raw(&self) -> &str {
        match self {
            Self::Legacy(raw) | Self::Plain(raw) => raw,
        }
    }

    /// The version with any legacy marker stripped.
    pub fn normalized(&self) -> &str {
        match self {
            Self::Legacy(raw) => raw.strip_prefix(LEGACY_MARKER).unwrap_or(raw),
            Self::Plain(raw) => raw,
        }
    }

    /// Whether this version was published in the legacy format.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Parse the normalized form as a semantic version.
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(self.normalized()).ok()
    }

    /// Compare by semantic-version precedence, ignoring the legacy marker.
    ///
    /// Build metadata does not take part, so `1.7.8+hotfix.2` and
    /// `1.7.8+hotfix.4` are equal. Strings that are not valid semver rank below every valid version and
    /// fall back to lexical order among themselves.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(a), Some(b)) => a.cmp_precedence(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.normalized().cmp(other.normalized()),
        }
    }
}

impl From<String> for ReleaseVersion {
    fn from(raw: String) -> Self {
        if raw.starts_with(LEGACY_MARKER) {
            Self::Legacy(raw)
        } else {
            Self::Plain(raw)
        }
    }
}

impl From<&str> for ReleaseVersion {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ReleaseVersion> for String {
    fn from(version: ReleaseVersion) -> Self {
        match version {
            ReleaseVersion::Legacy(raw) | ReleaseVersion::Plain(raw) => raw,
        }
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// One downloadable release in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Identifying key referenced by `current_release` pointers.
    pub hash: String,

    /// Channel the release was published on (`stable`, `beta`, `dev`).
    pub channel: String,

    /// Published version string.
    pub version: ReleaseVersion,

    /// Archive path relative to the storage base URL.
    pub archive: String,

    /// Publication timestamp, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    /// Archive checksum, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Bundled Dart SDK version, when the catalog records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart_sdk_version: Option<String>,

    /// Architecture of the bundled Dart SDK (`x64`, `arm64`), when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dart_sdk_arch: Option<String>,
}

/// The per-platform release catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Storage base URL advertised by the document itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Channel name to the `hash` of that channel's current release.
    pub current_release: BTreeMap<String, String>,

    /// All published releases, in document order.
    pub releases: Vec<Release>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not JSON of the expected shape.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The identifying key the catalog marks as current for `channel`.
    pub fn current_hash(&self, channel: &str) -> Option<&str> {
        self.current_release.get(channel).map(String::as_str)
    }

    /// Find a release by its identifying key.
    pub fn find_by_hash(&self, hash: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.hash == hash)
    }
}
