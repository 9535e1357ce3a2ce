//! Error types for connection management.

use nebula_proto::ProtocolError;
use thiserror::Error;

use crate::connection::{Generation, ReadyState};

/// Errors surfaced by the connection manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Send attempted while the socket is not open.
    #[error("cannot send while {state:?}")]
    NotOpen {
        /// Ready state at the time of the attempt
        state: ReadyState,
    },

    /// Event arrived from a superseded transport.
    #[error("stale event from {generation} (current {current:?})")]
    Stale {
        /// Generation that produced the event
        generation: Generation,
        /// Generation currently owned, if any
        current: Option<Generation>,
    },

    /// Command failed to serialize.
    #[error("encode failed: {0}")]
    Encode(#[from] ProtocolError),

    /// Underlying transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    /// Returns true if retrying later may succeed.
    ///
    /// Transport failures are recovered by the backoff policy. Encoding
    /// failures and stale events never succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotOpen { .. } | Self::Transport(_))
    }
}
