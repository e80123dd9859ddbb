//! Catalog file traversal, loading and saving.

use std::fs;
use std::path::{Path, PathBuf};

use swiftenv_schema::{RECORD_EXTENSION, RecordFile, VERSIONS_DIR, VersionRecord};
use walkdir::WalkDir;

use crate::CatalogError;
use crate::paths::{record_path, version_from_file_name};

/// Walk `root/versions` and return every catalog file.
///
/// Handles both the major-version sharded layout
/// (`versions/3/3.0.1.yaml`) and the legacy flat layout
/// (`versions/3.0.1.yaml`). A missing `versions` directory yields no files.
///
/// # Errors
///
/// Returns an error if a directory below the root cannot be read.
pub fn walk_record_files(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let versions_dir = root.join(VERSIONS_DIR);
    if !versions_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&versions_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == RECORD_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Load a single catalog file.
///
/// The explicit `version` field wins; files without one are identified by
/// their file name.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid record.
pub fn load_record(path: &Path) -> Result<VersionRecord, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let file: RecordFile = serde_yaml::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let fallback = version_from_file_name(path).unwrap_or_default();
    file.into_record(fallback)
        .map_err(|source| CatalogError::Record {
            path: path.to_path_buf(),
            source,
        })
}

/// Load every record stored under `root`, in file-walk order.
///
/// # Errors
///
/// Returns the first traversal, read or parse failure.
pub fn load_all(root: &Path) -> Result<Vec<VersionRecord>, CatalogError> {
    walk_record_files(root)?
        .iter()
        .map(|path| load_record(path))
        .collect()
}

/// Serialize a record in the current on-disk format.
///
/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn to_yaml(record: &VersionRecord) -> Result<String, CatalogError> {
    serde_yaml::to_string(record).map_err(|source| CatalogError::Serialize {
        version: record.version.clone(),
        source,
    })
}

/// Write a record to an explicit file, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directories or file cannot be written.
pub fn write_record(path: &Path, record: &VersionRecord) -> Result<(), CatalogError> {
    let content = to_yaml(record)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| CatalogError::io(path, e))
}

/// Write a record to its canonical location under `root` and return that
/// location.
///
/// # Errors
///
/// Returns an error if the identifier has no valid path or the write fails.
pub fn save_record(root: &Path, record: &VersionRecord) -> Result<PathBuf, CatalogError> {
    let path = record_path(root, &record.version)?;
    write_record(&path, record)?;
    Ok(path)
}
