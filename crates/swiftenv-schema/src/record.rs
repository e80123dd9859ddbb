//! Version records and their on-disk representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Arch;

/// Literal marker carried by every pre-release identifier.
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Download links of one platform, keyed by architecture (`x86_64`, `aarch64`).
pub type ArchBinaries = BTreeMap<String, String>;

/// Download links of a version, keyed by platform (`ubuntu16.04`, `osx`, ...).
pub type Binaries = BTreeMap<String, ArchBinaries>;

/// A released (or snapshot) Swift version and its binary download links.
///
/// Records compare equal when both the identifier and the full `binaries`
/// tree are equal. That comparison is what reconciliation uses to detect
/// scraped data that disagrees with what is already stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    /// Version identifier, e.g. `3.0.1` or `DEVELOPMENT-SNAPSHOT-2021-10-21-a`.
    pub version: String,
    /// Binary links, normalized to platform -> architecture -> URL.
    pub binaries: Binaries,
}

/// Errors raised when a record violates its invariants.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// The identifier is the empty string.
    #[error("Version identifier must not be empty")]
    EmptyVersion,
}

impl VersionRecord {
    /// Create a record with the given identifier and binaries.
    pub fn new(version: impl Into<String>, binaries: Binaries) -> Self {
        Self {
            version: version.into(),
            binaries,
        }
    }

    /// Create a record that has no binaries yet.
    pub fn empty(version: impl Into<String>) -> Self {
        Self::new(version, Binaries::new())
    }

    /// Check the record's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptyVersion`] if the identifier is empty.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.version.is_empty() {
            return Err(RecordError::EmptyVersion);
        }
        Ok(())
    }

    /// Whether this is a pre-release build.
    ///
    /// ```
    /// use swiftenv_schema::VersionRecord;
    ///
    /// assert!(VersionRecord::empty("2.2.1-SNAPSHOT-2016-04-23-a").is_snapshot());
    /// assert!(!VersionRecord::empty("2.2.0").is_snapshot());
    /// ```
    pub fn is_snapshot(&self) -> bool {
        self.version.contains(SNAPSHOT_MARKER)
    }

    /// Whether the version has a binary release for the given platform.
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.binaries.contains_key(platform)
    }

    /// Platform names with at least one binary, in sorted order.
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.binaries.keys().map(String::as_str)
    }

    /// Look up the download URL for a platform and architecture.
    pub fn binary(&self, platform: &str, arch: Arch) -> Option<&str> {
        self.binaries
            .get(platform)
            .and_then(|arches| arches.get(arch.as_str()))
            .map(String::as_str)
    }

    /// The download URL for a platform when no architecture was asked for.
    ///
    /// Prefers the default architecture and falls back to the first one
    /// published, so a platform with only `aarch64` builds still resolves.
    pub fn default_binary(&self, platform: &str) -> Option<&str> {
        let arches = self.binaries.get(platform)?;
        arches
            .get(Arch::default().as_str())
            .or_else(|| arches.values().next())
            .map(String::as_str)
    }

    /// Record a download URL, replacing any previous URL for the same
    /// platform and architecture.
    pub fn insert_binary(&mut self, platform: impl Into<String>, arch: Arch, url: impl Into<String>) {
        self.binaries
            .entry(platform.into())
            .or_default()
            .insert(arch.as_str().to_string(), url.into());
    }
}

impl std::fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// The binaries of a single platform as they appear on disk.
///
/// Early catalog files mapped a platform straight to a URL. Current files
/// map it to an architecture table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformBinaries {
    /// Legacy shape: a single URL, implicitly `x86_64`.
    Url(String),
    /// Current shape: architecture -> URL.
    Arches(ArchBinaries),
}

impl PlatformBinaries {
    /// Convert either shape into the architecture table.
    pub fn normalize(self) -> ArchBinaries {
        match self {
            Self::Url(url) => BTreeMap::from([(Arch::default().as_str().to_string(), url)]),
            Self::Arches(arches) => arches,
        }
    }
}

/// Raw content of a catalog file.
///
/// The `version` field is optional: files written before it was introduced
/// are identified by their file name instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFile {
    /// Explicit identifier, if the file carries one.
    #[serde(default)]
    pub version: Option<String>,
    /// Per-platform binaries in either on-disk shape.
    #[serde(default)]
    pub binaries: BTreeMap<String, PlatformBinaries>,
}

impl RecordFile {
    /// Build the in-memory record, using `fallback_version` when the file has
    /// no explicit identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::EmptyVersion`] if the resulting identifier is empty.
    pub fn into_record(self, fallback_version: &str) -> Result<VersionRecord, RecordError> {
        let version = self
            .version
            .unwrap_or_else(|| fallback_version.to_string());
        let binaries = self
            .binaries
            .into_iter()
            .map(|(platform, entry)| (platform, entry.normalize()))
            .collect();

        let record = VersionRecord { version, binaries };
        record.validate()?;
        Ok(record)
    }
}
