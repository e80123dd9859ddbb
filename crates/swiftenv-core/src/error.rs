//! Errors raised while reading, querying or writing the catalog.

use std::path::PathBuf;

use swiftenv_schema::RecordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A query that must match exactly one version matched none or several.
    #[error("No unique version matches {0}")]
    NotFound(String),

    #[error("Invalid version identifier '{0}'")]
    InvalidVersion(String),

    #[error("Invalid record in {}: {source}", path.display())]
    Record {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize {version}: {source}")]
    Serialize {
        version: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk catalog directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
