pub mod cache;
pub mod catalog;
pub mod channel;
pub mod env;
pub mod error;
pub mod install;
pub mod io;
pub mod resolver;
pub mod settings;
pub mod spec;
pub mod version_file;

pub use catalog::CatalogClient;
pub use error::ResolveError;
pub use resolver::{ResolvedRelease, Resolver, resolve};
pub use settings::Settings;
pub use spec::VersionSpec;

pub use flup_schema::{Arch, Catalog, Platform, Release, ReleaseVersion};

/// User Agent string for outgoing requests
pub const USER_AGENT: &str = concat!("flup/", env!("CARGO_PKG_VERSION"));

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}
