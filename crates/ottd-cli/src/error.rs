//! Error types for ottd-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from ottd-config
    #[error(transparent)]
    Config(#[from] ottd_config::Error),

    /// Error from ottd-content
    #[error(transparent)]
    Content(#[from] ottd_content::Error),

    /// Error from ottd-bans
    #[error(transparent)]
    Bans(#[from] ottd_bans::Error),

    /// Error from ottd-fs
    #[error(transparent)]
    Fs(#[from] ottd_fs::Error),

    #[error("Failed to set up logging: {message}")]
    Logging { message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
