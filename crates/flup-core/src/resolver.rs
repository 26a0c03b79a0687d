use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::CatalogClient;
use crate::channel::accepts;
use crate::error::ResolveError;
use crate::spec::VersionSpec;
use flup_schema::{Catalog, Platform, Release};

/// A release selected from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRelease {
    /// Channel the selected release was published on
    pub channel: String,
    /// Version with any legacy marker stripped
    pub version: String,
    /// Version exactly as published in the catalog
    pub raw_version: String,
    /// Archive locator, echoed from the catalog
    pub archive: String,
    /// `{storage_base}/{archive}`
    pub download_url: String,
}

impl ResolvedRelease {
    fn new(release: &Release, version: &str, storage_base: &str) -> Self {
        Self {
            channel: release.channel.clone(),
            version: version.to_string(),
            raw_version: release.version.raw().to_string(),
            archive: release.archive.clone(),
            download_url: format!(
                "{}/{}",
                storage_base.trim_end_matches('/'),
                release.archive
            ),
        }
    }

    /// File name of the archive, used to pick the extractor.
    pub fn archive_name(&self) -> &str {
        crate::filename_from_url(&self.download_url)
    }
}

/// Resolves a version specifier against a catalog snapshot.
///
/// - `Empty`: the release the catalog marks as current for `channel`.
/// - `Wildcard`: the highest release (semver precedence) whose version starts with the prefix.
/// - `Exact`: the release with exactly that version, falling back to a prefix
///   match when none is published under that exact string.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if no release satisfies the request.
pub fn resolve(
    catalog: &Catalog,
    spec: &VersionSpec,
    channel: &str,
    storage_base: &str,
) -> Result<ResolvedRelease, ResolveError> {
    match spec {
        VersionSpec::Empty => latest(catalog, channel, storage_base),
        VersionSpec::Wildcard { prefix, .. } => {
            wildcard(catalog, channel, prefix, &spec.to_string(), storage_base)
        }
        VersionSpec::Exact(value) => exact(catalog, channel, value, storage_base),
    }
}

fn latest(
    catalog: &Catalog,
    channel: &str,
    storage_base: &str,
) -> Result<ResolvedRelease, ResolveError> {
    let not_found =
        || ResolveError::NotFound(format!("unable to get latest version from channel {channel}"));

    let hash = catalog.current_hash(channel).ok_or_else(not_found)?;

    let Some(release) = catalog
        .releases
        .iter()
        .find(|r| r.hash == hash && accepts(&r.channel, channel))
    else {
        // Pointer to a key missing from the release list (or on another channel)
        warn!("current release {hash} for channel {channel} is not in the catalog");
        return Err(not_found());
    };

    debug!(
        "latest version from channel {} is {}",
        channel,
        release.version.raw()
    );

    Ok(ResolvedRelease::new(
        release,
        release.version.normalized(),
        storage_base,
    ))
}

fn wildcard(
    catalog: &Catalog,
    channel: &str,
    prefix: &str,
    requested: &str,
    storage_base: &str,
) -> Result<ResolvedRelease, ResolveError> {
    let mut candidates: Vec<&Release> = catalog
        .releases
        .iter()
        .filter(|r| accepts(&r.channel, channel) && r.version.normalized().starts_with(prefix))
        .collect();

    // Sort descending: newer versions first. Stable, so equal versions keep catalog order.
    candidates.sort_by(|a, b| b.version.cmp_precedence(&a.version));

    let release = candidates.first().ok_or_else(|| {
        ResolveError::NotFound(format!("unable to find release for {requested}"))
    })?;

    debug!(
        "latest version of {} from channel {} is {} ({} candidates)",
        requested,
        channel,
        release.version.raw(),
        candidates.len()
    );

    Ok(ResolvedRelease::new(
        release,
        release.version.normalized(),
        storage_base,
    ))
}

fn exact(
    catalog: &Catalog,
    channel: &str,
    value: &str,
    storage_base: &str,
) -> Result<ResolvedRelease, ResolveError> {
    let found = catalog
        .releases
        .iter()
        .find(|r| accepts(&r.channel, channel) && r.version.normalized() == value);

    match found {
        Some(release) => Ok(ResolvedRelease::new(release, value, storage_base)),
        None => {
            debug!("no release published as {value}, matching it as a prefix");
            wildcard(catalog, channel, value, value, storage_base)
        }
    }
}

/// Fetches the catalog and resolves against it, once per call.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalogs: CatalogClient,
}

impl Resolver {
    pub fn new(catalogs: CatalogClient) -> Self {
        Self { catalogs }
    }

    /// Resolve `version` on `channel` for `platform` against a freshly fetched catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::CatalogUnavailable`] if the catalog cannot be
    /// fetched, or [`ResolveError::NotFound`] if nothing matches.
    pub async fn determine(
        &self,
        version: &str,
        channel: &str,
        platform: Platform,
    ) -> Result<ResolvedRelease, ResolveError> {
        let catalog = self.catalogs.fetch(platform).await?;
        let spec = VersionSpec::parse(version);
        resolve(&catalog, &spec, channel, self.catalogs.storage_base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flup_schema::ReleaseVersion;

    const BASE: &str = "https://storage.googleapis.com/flutter_infra_release/releases";

    fn fixture() -> Catalog {
        Catalog::from_json(include_bytes!("../tests/data/releases_linux.json")).unwrap()
    }

    fn release(hash: &str, channel: &str, version: &str) -> Release {
        Release {
            hash: hash.into(),
            channel: channel.into(),
            version: ReleaseVersion::from(version),
            archive: format!("{channel}/linux/flutter_linux_{version}-{channel}.tar.xz"),
            release_date: None,
            sha256: None,
            dart_sdk_version: None,
            dart_sdk_arch: None,
        }
    }

    fn run(version: &str, channel: &str) -> Result<ResolvedRelease, ResolveError> {
        resolve(&fixture(), &VersionSpec::parse(version), channel, BASE)
    }

    #[test]
    fn test_latest_stable() {
        let result = run("", "stable").unwrap();
        assert_eq!(result.version, "2.0.5");
        assert_eq!(result.raw_version, "2.0.5");
        assert_eq!(result.channel, "stable");
        assert_eq!(
            result.download_url,
            format!("{BASE}/stable/linux/flutter_linux_2.0.5-stable.tar.xz")
        );
    }

    #[test]
    fn test_latest_beta_and_dev() {
        let beta = run("", "beta").unwrap();
        assert_eq!(beta.version, "2.2.0-10.1.pre");
        assert_eq!(beta.channel, "beta");

        let dev = run("", "dev").unwrap();
        assert_eq!(dev.version, "2.2.0-10.1.pre");
        assert_eq!(dev.channel, "dev");
        assert!(dev.download_url.contains("2.2.0-10.1.pre-dev"));
    }

    #[test]
    fn test_latest_any_has_no_pointer() {
        let err = run("", "any").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to get latest version from channel any"
        );
    }

    #[test]
    fn test_latest_dangling_pointer() {
        let mut catalog = fixture();
        catalog
            .current_release
            .insert("stable".into(), "0000000000000000000000000000000000000000".into());

        let err = resolve(&catalog, &VersionSpec::Empty, "stable", BASE).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "unable to get latest version from channel stable"
        );
    }

    #[test]
    fn test_latest_pointer_to_other_channel() {
        // stable points at a dev release: the invariant is broken, not a match
        let catalog = Catalog {
            base_url: None,
            current_release: [("stable".to_string(), "h1".to_string())]
                .into_iter()
                .collect(),
            releases: vec![release("h1", "dev", "1.0.0")],
        };
        assert!(
            resolve(&catalog, &VersionSpec::Empty, "stable", BASE)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_wildcard_new_format() {
        let result = run("1.17.x", "dev").unwrap();
        assert_eq!(result.version, "1.17.0-dev.5.0");
        assert_eq!(result.raw_version, "1.17.0-dev.5.0");
        assert!(result.download_url.contains("1.17.0-dev.5.0"));
    }

    #[test]
    fn test_short_input_matches_wildcard() {
        assert_eq!(run("1.17", "dev").unwrap(), run("1.17.x", "dev").unwrap());
    }

    #[test]
    fn test_wildcard_legacy_format() {
        let result = run("1.7.x", "dev").unwrap();
        assert_eq!(result.version, "1.7.11");
        assert_eq!(result.raw_version, "v1.7.11");
        assert!(result.download_url.contains("v1.7.11"));

        let short = run("1.7", "dev").unwrap();
        assert_eq!(short.raw_version, "v1.7.11");
    }

    #[test]
    fn test_wildcard_unknown_prefix() {
        let err = run("0.12.x", "dev").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "unable to find release for 0.12.x");

        let err = run("0.12", "dev").unwrap_err();
        assert_eq!(err.to_string(), "unable to find release for 0.12");
    }

    #[test]
    fn test_wildcard_any_channel() {
        let result = run("1.17.x", "any").unwrap();
        assert_eq!(result.version, "1.17.5");
        assert_eq!(result.channel, "stable");

        let result = run("1.19.x", "any").unwrap();
        assert_eq!(result.version, "1.19.0-5.0.pre");
    }

    #[test]
    fn test_wildcard_any_channel_prerelease_prefix() {
        let result = run("1.19.0-4.x", "any").unwrap();
        assert_eq!(result.version, "1.19.0-4.3.pre");
        assert_eq!(result.raw_version, "1.19.0-4.3.pre");
        assert_eq!(result.channel, "beta");
    }

    #[test]
    fn test_wildcard_respects_channel() {
        // 1.19.0-4.1.pre is the only 1.19 build on dev
        let result = run("1.19.x", "dev").unwrap();
        assert_eq!(result.version, "1.19.0-4.1.pre");
    }

    #[test]
    fn test_wildcard_selects_semver_maximum() {
        let catalog = fixture();
        let result = run("1.x", "any").unwrap();

        let max = catalog
            .releases
            .iter()
            .filter(|r| r.version.normalized().starts_with('1'))
            .filter_map(|r| semver::Version::parse(r.version.normalized()).ok())
            .max()
            .unwrap();
        assert_eq!(result.version, max.to_string());
    }

    #[test]
    fn test_wildcard_tie_keeps_catalog_order() {
        let catalog = Catalog {
            base_url: None,
            current_release: Default::default(),
            releases: vec![
                release("first", "beta", "3.0.0"),
                release("second", "dev", "v3.0.0"),
            ],
        };
        let spec = VersionSpec::parse("3.x");
        let result = resolve(&catalog, &spec, "any", BASE).unwrap();
        assert_eq!(result.channel, "beta");
        assert_eq!(result.raw_version, "3.0.0");
    }

    #[test]
    fn test_wildcard_build_metadata_tie_keeps_catalog_order() {
        let catalog = Catalog {
            base_url: None,
            current_release: Default::default(),
            releases: vec![
                release("hotfix-2", "dev", "v1.7.8+hotfix.2"),
                release("hotfix-4", "dev", "v1.7.8+hotfix.4"),
                release("older", "dev", "v1.7.5"),
            ],
        };
        let spec = VersionSpec::parse("1.7.x");
        let result = resolve(&catalog, &spec, "dev", BASE).unwrap();
        assert_eq!(result.raw_version, "v1.7.8+hotfix.2");
        assert_eq!(result.version, "1.7.8+hotfix.2");
    }

    #[test]
    fn test_wildcard_unparseable_ranks_below_semver() {
        let catalog = Catalog {
            base_url: None,
            current_release: Default::default(),
            releases: vec![
                release("odd", "stable", "1.7.9.1"),
                release("real", "stable", "1.7.2"),
            ],
        };
        let spec = VersionSpec::parse("1.7.x");
        let result = resolve(&catalog, &spec, "stable", BASE).unwrap();
        assert_eq!(result.version, "1.7.2");

        // Only unparseable candidates left: still resolvable
        let catalog = Catalog {
            releases: vec![release("odd", "stable", "1.7.9.1")],
            ..catalog
        };
        let result = resolve(&catalog, &spec, "stable", BASE).unwrap();
        assert_eq!(result.version, "1.7.9.1");
    }

    #[test]
    fn test_exact_match() {
        let result = run("1.17.0-dev.5.0", "dev").unwrap();
        assert_eq!(result.version, "1.17.0-dev.5.0");
        assert_eq!(result.raw_version, "1.17.0-dev.5.0");
    }

    #[test]
    fn test_exact_match_legacy() {
        let result = run("1.7.11", "dev").unwrap();
        assert_eq!(result.version, "1.7.11");
        assert_eq!(result.raw_version, "v1.7.11");
    }

    #[test]
    fn test_exact_preferred_over_higher_prefix_match() {
        let catalog = Catalog {
            base_url: None,
            current_release: Default::default(),
            releases: vec![
                release("hotfix", "stable", "1.17.0-dev.5.0+hotfix.1"),
                release("exact", "stable", "1.17.0-dev.5.0"),
            ],
        };
        let spec = VersionSpec::parse("1.17.0-dev.5.0");
        let result = resolve(&catalog, &spec, "stable", BASE).unwrap();
        assert_eq!(result.raw_version, "1.17.0-dev.5.0");
        assert!(result.archive.contains("1.17.0-dev.5.0-stable"));
    }

    #[test]
    fn test_exact_falls_back_to_prefix() {
        let catalog = Catalog {
            base_url: None,
            current_release: Default::default(),
            releases: vec![release("hotfix", "stable", "1.17.0-dev.5.0+hotfix.1")],
        };
        let spec = VersionSpec::parse("1.17.0-dev.5.0");
        let result = resolve(&catalog, &spec, "stable", BASE).unwrap();
        assert_eq!(result.version, "1.17.0-dev.5.0+hotfix.1");
    }

    #[test]
    fn test_exact_fallback_failure_names_request() {
        let err = run("1000.0.0", "dev").unwrap_err();
        assert_eq!(err.to_string(), "unable to find release for 1000.0.0");
    }

    #[test]
    fn test_exact_wrong_channel() {
        // 2.0.5 is only on stable
        assert!(run("2.0.5", "beta").unwrap_err().is_not_found());
        assert_eq!(run("2.0.5", "any").unwrap().channel, "stable");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = fixture();
        for (version, channel) in [("", "stable"), ("1.7.x", "dev"), ("2.0.5", "any")] {
            let spec = VersionSpec::parse(version);
            let first = resolve(&catalog, &spec, channel, BASE).unwrap();
            let second = resolve(&catalog, &spec, channel, BASE).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_legacy_and_plain_catalogs_agree() {
        let legacy = Catalog {
            base_url: None,
            current_release: [("stable".to_string(), "a".to_string())]
                .into_iter()
                .collect(),
            releases: vec![release("a", "stable", "v1.2.3")],
        };
        let plain = Catalog {
            base_url: None,
            current_release: [("stable".to_string(), "a".to_string())]
                .into_iter()
                .collect(),
            releases: vec![release("a", "stable", "1.2.3")],
        };

        for version in ["", "1.2.x", "1.2.3"] {
            let spec = VersionSpec::parse(version);
            let a = resolve(&legacy, &spec, "stable", BASE).unwrap();
            let b = resolve(&plain, &spec, "stable", BASE).unwrap();
            assert_eq!(a.version, b.version);
            assert_eq!(a.raw_version, "v1.2.3");
            assert_eq!(b.raw_version, "1.2.3");
        }
    }

    #[test]
    fn test_archive_name() {
        let result = run("", "stable").unwrap();
        assert_eq!(result.archive_name(), "flutter_linux_2.0.5-stable.tar.xz");
    }
}
