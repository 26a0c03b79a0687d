//! Stamps `FLUP_VERSION` for `flup --version`.
//!
//! Release builds are tagged; anything else reports the commit it was built
//! from, with a `-dev` suffix when the tree is dirty.

use std::process::Command;

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=-dev"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().trim_start_matches('v').to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");

    // Source tarballs have no git metadata
    let version = git_describe().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=FLUP_VERSION={version}");
}
