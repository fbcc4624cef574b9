//! Error types for ottd-config

use std::path::PathBuf;

/// Result type for ottd-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ottd-config operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse server config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    #[error("Cannot store {key:?} as a key in section [{section}]")]
    InvalidKey { section: String, key: String },

    #[error("Failed to serialize server config: {0}")]
    Serialize(#[source] std::io::Error),

    /// Filesystem error from ottd-fs
    #[error(transparent)]
    Fs(#[from] ottd_fs::Error),
}
