use std::path::{Path, PathBuf};

use swiftenv_schema::{RECORD_EXTENSION, VERSIONS_DIR};

use crate::CatalogError;

/// Prefix of trunk development snapshots, and of release-branch snapshots
/// once the branch version has been split off.
pub const DEVELOPMENT_SNAPSHOT: &str = "DEVELOPMENT-SNAPSHOT";

const DEVELOPMENT_SNAPSHOT_PREFIX: &str = "DEVELOPMENT-SNAPSHOT-";

/// Compute the storage path of a version, relative to the storage root.
///
/// - `DEVELOPMENT-SNAPSHOT-{year}-{month}-{rest}` is sharded by date:
///   `versions/DEVELOPMENT-SNAPSHOT/{year}/{month}/{rest}.yaml`
/// - `{version}-DEVELOPMENT-SNAPSHOT-{year}-{month}-{rest}` lives under its
///   branch: `versions/{major}/{version}-DEVELOPMENT-SNAPSHOT/{rest}.yaml`
/// - anything else is sharded by major version:
///   `versions/{major}/{identifier}.yaml`
///
/// # Errors
///
/// Returns [`CatalogError::InvalidVersion`] for an empty identifier or a
/// development snapshot whose date does not split into year, month and rest.
pub fn version_path(version: &str) -> Result<PathBuf, CatalogError> {
    if version.is_empty() {
        return Err(CatalogError::InvalidVersion(version.to_string()));
    }

    let versions = Path::new(VERSIONS_DIR);

    if let Some(dated) = version.strip_prefix(DEVELOPMENT_SNAPSHOT_PREFIX) {
        let (year, month, rest) = split_date(version, dated)?;
        return Ok(versions
            .join(DEVELOPMENT_SNAPSHOT)
            .join(year)
            .join(month)
            .join(record_file_name(rest)));
    }

    let (release, suffix) = match version.split_once('-') {
        Some((release, suffix)) => (release, Some(suffix)),
        None => (version, None),
    };
    let major = release.split('.').next().unwrap_or(release);

    if let Some(dated) = suffix.and_then(|s| s.strip_prefix(DEVELOPMENT_SNAPSHOT_PREFIX)) {
        let (_, _, rest) = split_date(version, dated)?;
        return Ok(versions
            .join(major)
            .join(format!("{release}-{DEVELOPMENT_SNAPSHOT}"))
            .join(record_file_name(rest)));
    }

    Ok(versions.join(major).join(record_file_name(version)))
}

/// Absolute location of a version's catalog file under `root`.
///
/// # Errors
///
/// See [`version_path`].
pub fn record_path(root: &Path, version: &str) -> Result<PathBuf, CatalogError> {
    Ok(root.join(version_path(version)?))
}

/// Identifier implied by a catalog file's name, used for files that do not
/// carry an explicit `version` field.
pub fn version_from_file_name(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

fn record_file_name(stem: &str) -> String {
    format!("{stem}.{RECORD_EXTENSION}")
}

fn split_date<'a>(version: &str, dated: &'a str) -> Result<(&'a str, &'a str, &'a str), CatalogError> {
    let mut parts = dated.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(rest))
            if !year.is_empty() && !month.is_empty() && !rest.is_empty() =>
        {
            Ok((year, month, rest))
        }
        _ => Err(CatalogError::InvalidVersion(version.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_snapshot_path() {
        assert_eq!(
            version_path("DEVELOPMENT-SNAPSHOT-2021-10-21-a").unwrap(),
            Path::new("versions/DEVELOPMENT-SNAPSHOT/2021/10/21-a.yaml")
        );
    }

    #[test]
    fn test_branch_snapshot_path() {
        assert_eq!(
            version_path("5.5-DEVELOPMENT-SNAPSHOT-2021-10-21-a").unwrap(),
            Path::new("versions/5/5.5-DEVELOPMENT-SNAPSHOT/21-a.yaml")
        );
    }

    #[test]
    fn test_release_path() {
        assert_eq!(
            version_path("3.0.1").unwrap(),
            Path::new("versions/3/3.0.1.yaml")
        );
        assert_eq!(version_path("5").unwrap(), Path::new("versions/5/5.yaml"));
    }

    #[test]
    fn test_legacy_snapshot_keeps_full_identifier() {
        assert_eq!(
            version_path("2.2.1-SNAPSHOT-2016-04-23-a").unwrap(),
            Path::new("versions/2/2.2.1-SNAPSHOT-2016-04-23-a.yaml")
        );
    }

    #[test]
    fn test_malformed_identifiers_are_rejected() {
        assert!(matches!(
            version_path(""),
            Err(CatalogError::InvalidVersion(_))
        ));
        assert!(matches!(
            version_path("DEVELOPMENT-SNAPSHOT-2021"),
            Err(CatalogError::InvalidVersion(_))
        ));
        assert!(matches!(
            version_path("5.5-DEVELOPMENT-SNAPSHOT-2021-10"),
            Err(CatalogError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_record_path_joins_root() {
        let root = Path::new("/srv/swiftenv");
        assert_eq!(
            record_path(root, "3.0.1").unwrap(),
            Path::new("/srv/swiftenv/versions/3/3.0.1.yaml")
        );
    }

    #[test]
    fn test_version_from_file_name() {
        assert_eq!(
            version_from_file_name(Path::new("versions/2.2.yaml")),
            Some("2.2")
        );
        assert_eq!(
            version_from_file_name(Path::new("versions/3/3.0.1.yaml")),
            Some("3.0.1")
        );
    }
}
