//! Error types for the Dirgate core crate.

use thiserror::Error;

/// Top-level error type for all Dirgate operations.
#[derive(Debug, Error)]
pub enum DirgateError {
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable credentials exist for the domain. Recoverable by running
    /// the setup flow again.
    #[error("setup needed: {0}")]
    SetupNeeded(String),

    /// The stored service account key is unusable and has been deleted.
    #[error("invalid service account key: {0}")]
    InvalidKey(String),

    /// The authorization server rejected a token refresh. Callers of the
    /// admin checker never see this; it is converted to [`SetupNeeded`]
    /// after the stored credentials are deleted.
    ///
    /// [`SetupNeeded`]: DirgateError::SetupNeeded
    #[error("token refresh rejected: {0}")]
    TokenRefresh(String),

    #[error("directory API error: {0}")]
    Directory(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenience Result alias that defaults to [`DirgateError`].
pub type Result<T> = std::result::Result<T, DirgateError>;
