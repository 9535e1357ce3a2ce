//! Connection management for the Nebula client.
//!
//! The [`ConnectionManager`] owns the lifecycle of the single live game socket:
//! connecting, reconnecting with exponential backoff, detecting forced session
//! replacement, and decoding inbound frames. It performs no I/O. Callers feed
//! it transport events tagged with a [`Generation`] and execute the
//! [`ConnectionAction`]s it returns.
//!
//! # Generations
//!
//! Every transport the manager opens gets a fresh [`Generation`]. Events that
//! carry an older generation come from a superseded socket and are ignored,
//! so a callback delivered after replacement can never touch current state.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod error;

pub use connection::{
    ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionStatus,
    DisconnectReason, Generation, ReadyState,
};
pub use error::ConnectionError;
