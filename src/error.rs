//! Typed errors for the JSON data store.
//!
//! Commands themselves return `Box<dyn Error>`; the store keeps a concrete
//! error type so callers can tell a missing file from a malformed one.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing data files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required data file does not exist.
    #[error("data file not found: {0}")]
    MissingFile(PathBuf),

    /// Filesystem failure on a specific path.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not the JSON shape we expect.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The YAML config file could not be parsed.
    #[error("malformed YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::MissingFile(path)
        } else {
            StoreError::Io { path, source }
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying problem is an absent file.
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::MissingFile(_))
    }
}
