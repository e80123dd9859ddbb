//! The version catalog: lazy loading, filtering and exact lookup.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use swiftenv_schema::VersionRecord;
use tracing::debug;

use crate::CatalogError;
use crate::storage;

/// Query criteria for [`Catalog::filter`] and [`Catalog::get`].
///
/// Every supplied predicate must hold; `None` means "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Exact identifier match.
    pub version: Option<String>,
    /// `Some(true)` keeps snapshots only, `Some(false)` releases only.
    pub snapshot: Option<bool>,
    /// Keep versions that publish binaries for this platform.
    pub platform: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.snapshot.is_none() && self.platform.is_none()
    }

    /// Whether a single record satisfies every predicate.
    pub fn matches(&self, record: &VersionRecord) -> bool {
        if let Some(version) = &self.version {
            if &record.version != version {
                return false;
            }
        }
        if let Some(snapshot) = self.snapshot {
            if record.is_snapshot() != snapshot {
                return false;
            }
        }
        if let Some(platform) = &self.platform {
            if !record.supports_platform(platform) {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(version) = &self.version {
            parts.push(format!("version={version}"));
        }
        if let Some(snapshot) = self.snapshot {
            parts.push(format!("snapshot={snapshot}"));
        }
        if let Some(platform) = &self.platform {
            parts.push(format!("platform={platform}"));
        }
        if parts.is_empty() {
            write!(f, "(no criteria)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// A view over the stored versions.
///
/// A catalog opened on a storage root reads `versions/` on first access and
/// keeps the sorted result for its lifetime. Filtering produces new views
/// that own their subset and never touch storage.
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    versions: OnceLock<Vec<VersionRecord>>,
}

impl Catalog {
    /// Open the catalog stored under `root`. Nothing is read until the
    /// versions are first needed.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            versions: OnceLock::new(),
        }
    }

    /// Build a view over an already loaded set of records.
    pub fn from_records(root: impl Into<PathBuf>, mut records: Vec<VersionRecord>) -> Self {
        records.sort_by(|a, b| a.version.cmp(&b.version));
        Self {
            root: root.into(),
            versions: OnceLock::from(records),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All versions of this view, sorted by identifier.
    ///
    /// Ordering is plain string ordering, so `10.0` sorts before `9.0`.
    ///
    /// # Errors
    ///
    /// Returns an error if loading from storage fails. A failed load is not
    /// cached; the next call tries again.
    pub fn versions(&self) -> Result<&[VersionRecord], CatalogError> {
        if let Some(versions) = self.versions.get() {
            return Ok(versions.as_slice());
        }

        let mut loaded = storage::load_all(&self.root)?;
        loaded.sort_by(|a, b| a.version.cmp(&b.version));
        debug!(count = loaded.len(), root = %self.root.display(), "loaded catalog");

        // A concurrent loader may have won the race; its result is identical.
        Ok(self.versions.get_or_init(|| loaded).as_slice())
    }

    /// The unfiltered view, which is this catalog itself.
    pub fn all(&self) -> &Self {
        self
    }

    /// A new view with the versions matching every predicate of `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if this view has not been loaded yet and loading fails.
    pub fn filter(&self, filter: &Filter) -> Result<Catalog, CatalogError> {
        let versions: Vec<VersionRecord> = self
            .versions()?
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        Ok(Self {
            root: self.root.clone(),
            versions: OnceLock::from(versions),
        })
    }

    /// The single version matching `filter`.
    ///
    /// With an empty filter this view itself must hold exactly one version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when zero or more than one version
    /// matches, or a storage error if loading fails.
    pub fn get(&self, filter: &Filter) -> Result<VersionRecord, CatalogError> {
        if !filter.is_empty() {
            return self.filter(filter)?.get(&Filter::default());
        }

        match self.versions()? {
            [record] => Ok(record.clone()),
            _ => Err(CatalogError::NotFound(filter.to_string())),
        }
    }

    /// Number of versions in this view.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.versions()?.len())
    }

    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.versions()?.is_empty())
    }

    /// Identifiers of this view, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub fn names(&self) -> Result<Vec<&str>, CatalogError> {
        Ok(self.versions()?.iter().map(|v| v.version.as_str()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use swiftenv_schema::Arch;
    use tempfile::TempDir;

    fn record(version: &str, platforms: &[&str]) -> VersionRecord {
        let mut record = VersionRecord::empty(version);
        for platform in platforms {
            record.insert_binary(*platform, Arch::X86_64, format!("https://example.com/{version}-{platform}"));
        }
        record
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_records(
            "unused",
            vec![
                record("3.0.1", &["ubuntu16.04", "osx"]),
                record("2.2", &["ubuntu14.04", "osx"]),
                record("2.2.1-SNAPSHOT-2016-04-23-a", &["ubuntu14.04"]),
                record("DEVELOPMENT-SNAPSHOT-2021-10-21-a", &["ubuntu20.04"]),
            ],
        )
    }

    #[test]
    fn test_versions_are_sorted_lexicographically() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.names().unwrap(),
            vec![
                "2.2",
                "2.2.1-SNAPSHOT-2016-04-23-a",
                "3.0.1",
                "DEVELOPMENT-SNAPSHOT-2021-10-21-a"
            ]
        );

        let catalog = Catalog::from_records("unused", vec![record("9.0", &[]), record("10.0", &[])]);
        assert_eq!(catalog.names().unwrap(), vec!["10.0", "9.0"]);
    }

    #[test]
    fn test_all_is_identity() {
        let catalog = sample_catalog();
        assert!(std::ptr::eq(catalog.all(), &catalog));
    }

    #[test]
    fn test_filter_snapshots() {
        let catalog = sample_catalog();

        let snapshots = catalog.filter(&Filter::new().snapshot(true)).unwrap();
        assert_eq!(
            snapshots.names().unwrap(),
            vec!["2.2.1-SNAPSHOT-2016-04-23-a", "DEVELOPMENT-SNAPSHOT-2021-10-21-a"]
        );

        let releases = catalog.filter(&Filter::new().snapshot(false)).unwrap();
        assert_eq!(releases.names().unwrap(), vec!["2.2", "3.0.1"]);
    }

    #[test]
    fn test_filter_platform_keeps_matches() {
        let catalog = sample_catalog();
        let filtered = catalog.filter(&Filter::new().platform("osx")).unwrap();
        assert_eq!(filtered.names().unwrap(), vec!["2.2", "3.0.1"]);
    }

    #[test]
    fn test_filter_does_not_mutate_receiver() {
        let catalog = sample_catalog();
        let _ = catalog.filter(&Filter::new().version("3.0.1")).unwrap();
        assert_eq!(catalog.len().unwrap(), 4);
    }

    #[test]
    fn test_filter_composition_is_intersection() {
        let catalog = sample_catalog();

        let chained = catalog
            .filter(&Filter::new().platform("ubuntu14.04"))
            .unwrap()
            .filter(&Filter::new().snapshot(true))
            .unwrap();
        let reversed = catalog
            .filter(&Filter::new().snapshot(true))
            .unwrap()
            .filter(&Filter::new().platform("ubuntu14.04"))
            .unwrap();
        let combined = catalog
            .filter(&Filter::new().platform("ubuntu14.04").snapshot(true))
            .unwrap();

        assert_eq!(chained.versions().unwrap(), combined.versions().unwrap());
        assert_eq!(reversed.versions().unwrap(), combined.versions().unwrap());
        assert_eq!(combined.names().unwrap(), vec!["2.2.1-SNAPSHOT-2016-04-23-a"]);
    }

    #[test]
    fn test_get_exact_version() {
        let catalog = sample_catalog();
        let found = catalog.get(&Filter::new().version("3.0.1")).unwrap();
        assert_eq!(found.version, "3.0.1");
        assert!(found.supports_platform("ubuntu16.04"));
    }

    #[test]
    fn test_get_single_record_view() {
        let catalog = Catalog::from_records("unused", vec![record("3.0.1", &[])]);
        assert_eq!(catalog.get(&Filter::default()).unwrap().version, "3.0.1");
    }

    #[test]
    fn test_get_requires_exactly_one_match() {
        let catalog = sample_catalog();

        let none = catalog.get(&Filter::new().version("1.0"));
        assert!(matches!(none, Err(CatalogError::NotFound(_))));

        let many = catalog.get(&Filter::new().platform("osx"));
        assert!(matches!(many, Err(CatalogError::NotFound(_))));

        let unfiltered = catalog.get(&Filter::default());
        assert!(matches!(unfiltered, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_lazy_load_from_storage() {
        let temp = TempDir::new().unwrap();
        let versions = temp.path().join("versions");
        fs::create_dir_all(versions.join("3")).unwrap();
        fs::create_dir_all(versions.join("DEVELOPMENT-SNAPSHOT/2021/10")).unwrap();

        // Legacy flat layout, identified by file name
        fs::write(
            versions.join("2.2.yaml"),
            "binaries:\n  osx: https://example.com/swift-2.2-RELEASE-osx.pkg\n",
        )
        .unwrap();
        fs::write(
            versions.join("3/3.0.1.yaml"),
            "version: 3.0.1\nbinaries:\n  ubuntu16.04:\n    x86_64: https://example.com/a.tar.gz\n",
        )
        .unwrap();
        fs::write(
            versions.join("DEVELOPMENT-SNAPSHOT/2021/10/21-a.yaml"),
            "version: DEVELOPMENT-SNAPSHOT-2021-10-21-a\nbinaries:\n  ubuntu20.04:\n    aarch64: https://example.com/b.tar.gz\n",
        )
        .unwrap();

        let catalog = Catalog::open(temp.path());
        assert_eq!(
            catalog.names().unwrap(),
            vec!["2.2", "3.0.1", "DEVELOPMENT-SNAPSHOT-2021-10-21-a"]
        );

        let legacy = catalog.get(&Filter::new().version("2.2")).unwrap();
        assert_eq!(
            legacy.binary("osx", Arch::X86_64),
            Some("https://example.com/swift-2.2-RELEASE-osx.pkg")
        );

        // Cached: later writes are not observed by this instance
        fs::write(versions.join("3/3.1.yaml"), "binaries: {}\n").unwrap();
        assert_eq!(catalog.len().unwrap(), 3);
        assert_eq!(Catalog::open(temp.path()).len().unwrap(), 4);
    }
}
