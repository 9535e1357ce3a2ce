//! Client error types.

use thiserror::Error;

/// Socket failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Read or write on an open socket failed.
    #[error("stream error: {0}")]
    Stream(String),

    /// The socket task is gone.
    #[error("socket closed")]
    Closed,
}

impl TransportError {
    /// Returns true if the connection manager's backoff should handle it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Stream(_))
    }
}

/// REST failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// Non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Returns true if retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) => false,
        }
    }
}

/// Invalid endpoint configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No REST URL given.
    #[error("server URL is empty")]
    Empty,

    /// URL has the wrong scheme.
    #[error("{url}: expected an {expected} URL")]
    Scheme {
        /// Offending URL
        url: String,
        /// Expected scheme family
        expected: &'static str,
    },
}
