//! Network transports for the Nebula client
//!
//! Endpoint configuration and error types are always available. With the
//! `transport` feature enabled, this crate also provides the real I/O used by
//! the terminal client:
//! - [`socket::Socket`]: one WebSocket connection owned by a background task
//! - [`api::ApiClient`]: REST access to map, system and battle data
//! - [`activity::ActivityStream`]: server-sent activity events with a
//!   fixed-delay reconnect

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod activity;
#[cfg(feature = "transport")]
pub mod api;
#[cfg(feature = "transport")]
pub mod socket;

pub use config::{ClientConfig, DEFAULT_MAP_REFRESH, derive_ws_url};
pub use error::{ApiError, ConfigError, TransportError};
pub use event::{SocketEvent, TransportEvent};
