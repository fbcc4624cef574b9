//! Error types for ottd-bans

/// Result type for ottd-bans operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while merging ban lists
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lock or ban file I/O error from ottd-fs
    #[error(transparent)]
    Fs(#[from] ottd_fs::Error),

    /// Server config error from ottd-config
    #[error(transparent)]
    Config(#[from] ottd_config::Error),

    #[error("Ban merge task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
