//! Version specifier parsing
//!
//! Supports:
//! - Latest: `""`
//! - Wildcard: `1.7.x`, or any input with fewer than three segments (`1`, `1.7`)
//! - Exact: `2.0.5`, `1.17.0-dev.5.0`

use std::convert::Infallible;

/// Suffix marking a wildcard specifier.
pub const WILDCARD_SUFFIX: &str = ".x";

/// A parsed version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// No version given: take the channel's current release.
    Empty,
    /// Highest release whose version starts with `prefix`.
    ///
    /// `widened` is set when the prefix came from a short input like `1.7`
    /// rather than an explicit `1.7.x`, so the original text can be echoed.
    Wildcard { prefix: String, widened: bool },
    /// A full version string.
    Exact(String),
}

impl VersionSpec {
    /// Classify a raw specifier. Never fails; any string is representable.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::Empty;
        }

        if let Some(prefix) = raw.strip_suffix(WILDCARD_SUFFIX) {
            return Self::Wildcard {
                prefix: prefix.to_string(),
                widened: false,
            };
        }

        // A partial version means "best match under this prefix", not a literal
        if raw.split('.').count() < 3 {
            return Self::Wildcard {
                prefix: raw.to_string(),
                widened: true,
            };
        }

        Self::Exact(raw.to_string())
    }

    /// Check if this specifier names a single version
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

impl std::str::FromStr for VersionSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Reproduces the specifier text as the user wrote it.
impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Wildcard {
                prefix,
                widened: true,
            } => write!(f, "{prefix}"),
            Self::Wildcard {
                prefix,
                widened: false,
            } => write!(f, "{prefix}{WILDCARD_SUFFIX}"),
            Self::Exact(value) => write!(f, "{value}"),
        }
    }
}
