//! Merging freshly scraped versions into the stored catalog.
//!
//! Reconciliation is additive: unknown versions are written, known versions
//! are compared and a disagreement is only reported. Stored files are never
//! overwritten by scraped data.

use std::path::{Path, PathBuf};

use swiftenv_schema::{Arch, VERSIONS_DIR, VersionRecord};
use thiserror::Error;
use tracing::{info, warn};

use crate::CatalogError;
use crate::git::{GitError, VersionControl};
use crate::paths::record_path;
use crate::storage;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Version control failed: {0}")]
    Git(#[from] GitError),
}

/// What a reconciliation run is allowed to do besides writing files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Commit every added version on its own.
    pub commit: bool,
    /// Push after the run if anything was added.
    pub push: bool,
}

impl ReconcileOptions {
    /// Pushing implies committing.
    pub fn new(commit: bool, push: bool) -> Self {
        Self {
            commit: commit || push,
            push,
        }
    }
}

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Versions written for the first time.
    pub added: Vec<String>,
    /// Versions whose stored data disagrees with the scraped data.
    pub mismatched: Vec<String>,
    /// Whether the added versions were pushed.
    pub pushed: bool,
}

impl ReconcileReport {
    /// True if the catalog gained at least one version.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Applies scraped versions to the catalog stored under a root directory.
#[derive(Debug)]
pub struct Reconciler<V: VersionControl> {
    root: PathBuf,
    vcs: V,
    options: ReconcileOptions,
}

impl<V: VersionControl> Reconciler<V> {
    pub fn new(root: impl Into<PathBuf>, vcs: V, options: ReconcileOptions) -> Self {
        Self {
            root: root.into(),
            vcs,
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add every scraped version that is not stored yet, then publish if
    /// requested and something changed.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable stored file, failed write or failed
    /// git command. Versions handled before the failure stay written.
    pub fn reconcile(&self, scraped: &[VersionRecord]) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        for record in scraped {
            self.save_version(record, &mut report)?;
        }

        if report.changed() && self.options.push {
            self.vcs.push()?;
            report.pushed = true;
        }

        Ok(report)
    }

    fn save_version(&self, record: &VersionRecord, report: &mut ReconcileReport) -> Result<(), ReconcileError> {
        let path = record_path(&self.root, &record.version)?;

        if path.exists() {
            let existing = storage::load_record(&path)?;
            if &existing != record {
                warn!(version = %record, path = %path.display(), "Mismatched data");
                report.mismatched.push(record.version.clone());
            }
            return Ok(());
        }

        info!(version = %record, "Add {record}");
        storage::write_record(&path, record)?;
        report.added.push(record.version.clone());

        if self.options.commit {
            self.vcs.commit(&path, &format!("chore: Add {}", record.version))?;
        }

        Ok(())
    }

    /// Rewrite every stored record in the current file format, in place.
    ///
    /// Records with an `aarch64` platform key come from the parser that
    /// predates architecture support and are left untouched. Returns the
    /// number of files rewritten.
    ///
    /// # Errors
    ///
    /// Returns the first read or write failure.
    pub fn resave(&self) -> Result<usize, ReconcileError> {
        let mut rewritten = 0;

        for path in storage::walk_record_files(&self.root)? {
            let record = storage::load_record(&path)?;
            if record.supports_platform(Arch::Aarch64.as_str()) {
                info!(version = %record, "Skipping legacy aarch64 record");
                continue;
            }
            if !self.is_stored_at(&record, &path) {
                warn!(version = %record, path = %path.display(), "Skipping record whose identifier does not match its path");
                continue;
            }

            storage::write_record(&path, &record)?;
            info!(version = %record, path = %path.display(), "Resaved");
            rewritten += 1;
        }

        Ok(rewritten)
    }

    /// Whether `path` is where `record` belongs: its sharded location, or
    /// directly inside the legacy flat `versions/` directory.
    fn is_stored_at(&self, record: &VersionRecord, path: &Path) -> bool {
        let flat = path.parent() == Some(self.root.join(VERSIONS_DIR).as_path());
        flat || record_path(&self.root, &record.version).is_ok_and(|expected| expected == path)
    }
}
