//! Release channel filtering

/// Query-time wildcard accepting releases from every channel. Never stored on a release.
pub const ANY_CHANNEL: &str = "any";

/// Channel tracked by building from the tip of the repository.
pub const MASTER_CHANNEL: &str = "master";

/// Channels published in the release catalog.
pub const PUBLISHED_CHANNELS: [&str; 3] = ["stable", "beta", "dev"];

/// Returns true if a release on `release_channel` satisfies a request for `requested`.
pub fn accepts(release_channel: &str, requested: &str) -> bool {
    release_channel == requested || requested == ANY_CHANNEL
}

/// Check whether `name` is a known channel name (including `master`).
pub fn is_channel_name(name: &str) -> bool {
    name == MASTER_CHANNEL || PUBLISHED_CHANNELS.contains(&name)
}
