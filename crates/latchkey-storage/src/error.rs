use std::path::PathBuf;
use thiserror::Error;

/// Storage-specific error types for the Latchkey controller.
///
/// These errors cover the persisted key store, the configuration file and the
/// removable media used for bulk import and export.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted file is not valid JSON of the expected shape
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Credential id or label failed validation
    #[error(transparent)]
    Validation(#[from] latchkey_core::Error),

    /// Operation on a credential that is not in the store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// No removable media is mounted
    #[error("No removable media present")]
    MediaAbsent,

    /// Removable media is mounted but holds no file to import
    #[error("Nothing to import: {0} does not exist")]
    SourceMissing(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
