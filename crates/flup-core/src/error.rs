//! Resolution errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// No catalog entry satisfies the requested version and channel.
    #[error("{0}")]
    NotFound(String),

    /// The catalog could not be fetched or did not parse.
    #[error("unable to get releases from {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },
}

impl ResolveError {
    pub fn catalog_unavailable(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::CatalogUnavailable {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
