//! Client error types.

use thiserror::Error;

/// Errors returned by route API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },

    /// Token exchange was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API returned a route that could not be interpreted.
    #[error("invalid route payload: {0}")]
    Decode(String),

    /// Client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Status { status: 401, .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
