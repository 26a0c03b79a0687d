//! Release catalog fetch

use reqwest::Client;
use tracing::debug;

use crate::error::ResolveError;
use flup_schema::{Catalog, Platform};

/// Fetches per-platform catalogs from the release storage bucket.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    storage_base: String,
}

impl CatalogClient {
    pub fn new(client: Client, storage_base: impl Into<String>) -> Self {
        Self {
            client,
            storage_base: storage_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL that catalog documents and archives live under.
    pub fn storage_base(&self) -> &str {
        &self.storage_base
    }

    /// URL of the catalog document for `platform`.
    pub fn catalog_url(&self, platform: Platform) -> String {
        format!("{}/{}", self.storage_base, platform.catalog_file())
    }

    /// Download and parse the catalog for `platform`. No retries.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::CatalogUnavailable`] on transport failure,
    /// a non-success status, or a document that does not parse.
    pub async fn fetch(&self, platform: Platform) -> Result<Catalog, ResolveError> {
        let url = self.catalog_url(platform);
        debug!("Fetching release catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ResolveError::catalog_unavailable(&url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::catalog_unavailable(&url, e))?;

        let catalog =
            Catalog::from_json(&bytes).map_err(|e| ResolveError::catalog_unavailable(&url, e))?;

        debug!(
            "Catalog has {} releases across {} channels",
            catalog.releases.len(),
            catalog.current_release.len()
        );

        Ok(catalog)
    }
}
