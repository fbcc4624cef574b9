//! Error types for ottd-fs

use std::path::PathBuf;
use std::time::Duration;

/// Result type for ottd-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ottd-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Gave up waiting for lock {path} after {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
