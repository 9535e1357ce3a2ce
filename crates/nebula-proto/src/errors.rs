//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fragment is not a JSON object with a string `type` field.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Payload did not match the shape expected for its type.
    #[error("invalid payload for {kind}: {reason}")]
    InvalidPayload {
        /// Message type the payload was attached to
        kind: String,
        /// Decoder error description
        reason: String,
    },

    /// Command could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedFrame(err.to_string())
    }
}
