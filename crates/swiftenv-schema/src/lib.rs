//! Shared types and on-disk format for the swiftenv version catalog.

pub mod arch;
pub mod record;

// Re-exports
pub use arch::*;
pub use record::*;

/// Directory, relative to the storage root, holding every catalog file.
pub const VERSIONS_DIR: &str = "versions";

/// File extension of catalog files.
pub const RECORD_EXTENSION: &str = "yaml";
