//! Deterministic simulation harness for the Nebula client.
//!
//! [`SimDriver`] implements the app's `Driver` trait over a virtual clock and
//! scripted transports, so the production `Runtime` runs unchanged in tests.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties after every render.
//! Use [`InvariantRegistry::standard()`] for the common client invariants.
//!
//! # Fault Injection
//!
//! [`ChaosNetwork`] replays a seeded schedule of drops, takeovers and timer
//! firings against a driver.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod chaos;
pub mod clock;
pub mod invariants;
pub mod script;
pub mod sim_driver;

pub use chaos::{ChaosNetwork, Fault};
pub use clock::SimInstant;
pub use invariants::{
    BoundedBuffers, ClientSnapshot, ConnectedMatchesStatus, Invariant, InvariantRegistry,
    InvariantResult, LogNewestFirst, ReconnectDelayBounded, ReplacedNeverReconnects,
    SingleLiveTransport, Violation,
};
pub use sim_driver::{SIM_EPOCH_MILLIS, SimDriver, SimDriverError, drain};
