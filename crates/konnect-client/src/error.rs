//! Error taxonomy for the Connect REST client.
//!
//! Only connection-level failures are retryable: a non-2xx response is an
//! authoritative server outcome, not a transient condition.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The transport could not reach the service at all (connect failure or
    /// request timeout).
    #[error("connection error: {0}")]
    Connection(String),

    /// Any non-2xx HTTP response, carrying the status and raw body text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Client-side logical precondition failure (e.g. connector already
    /// exists).
    #[error("{0}")]
    Conflict(String),

    /// A state name the fixed enumeration does not know.
    #[error("unknown connector state: {0}")]
    UnknownState(String),

    /// Malformed or missing response payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON decode failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether a retry could plausibly succeed. True only for
    /// connection-level failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Whether this is an authoritative "resource does not exist" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
