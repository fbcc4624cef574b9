//! Error types for ottd-content

use std::path::PathBuf;

/// Result type for ottd-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synchronising content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `[newgrf]` key that is not `id|hash|name[/version]`
    #[error("Malformed NewGRF entry {entry:?}: {reason}")]
    MalformedEntry { entry: String, reason: String },

    #[error("Invalid content CDN URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The CDN answered with anything but 200 OK
    #[error("Could not download from BaNaNaS: {status}")]
    Status { url: String, status: String },

    /// The body could not be decompressed or written to the cache
    #[error("Failed to store {cache_key}: {source}")]
    Transfer {
        cache_key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Content cache directory {path} does not exist")]
    CacheRootMissing { path: PathBuf },

    /// Filesystem error from ottd-fs
    #[error(transparent)]
    Fs(#[from] ottd_fs::Error),
}
