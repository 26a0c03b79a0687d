//! Shared types and wire format for flup.
//!
//! The release catalog is published per platform as a JSON document. This
//! crate owns its in-memory shape and the platform/architecture identifiers
//! used to pick the right document and cache slot.

pub mod arch;
pub mod catalog;

// Re-exports
pub use arch::*;
pub use catalog::{Catalog, Release, ReleaseVersion};

/// Single-character marker carried by legacy catalog version strings (`v1.7.11`).
pub const LEGACY_MARKER: char = 'v';
