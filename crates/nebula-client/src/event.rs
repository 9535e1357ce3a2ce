//! Socket events.

use nebula_core::Generation;

/// What happened on one transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket opened.
    Opened,
    /// One physical text message.
    Message(String),
    /// Socket closed.
    Closed {
        /// Close code, if any.
        code: Option<u16>,
    },
    /// Socket error. Always followed by `Closed`.
    Error(String),
}

/// A [`TransportEvent`] tagged with the transport that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    /// Producing transport.
    pub generation: Generation,
    /// What happened.
    pub event: TransportEvent,
}
