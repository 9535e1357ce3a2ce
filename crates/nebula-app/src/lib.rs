//! Application layer for the Nebula client
//!
//! Pure state machines and a generic runtime for the play client, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Data flow
//!
//! ```text
//! Driver ──transport events──> Dispatcher ──> ConnectionManager
//!                                   │                │
//!                                   │<── Notify ─────┘
//!                                   v
//!                              GameState::apply
//! ```
//!
//! # Components
//!
//! - [`GameState`]: the view model, folded from [`GameAction`]s
//! - [`Dispatcher`]: routes connection notifications into the reducer
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic orchestration loop using a Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod dispatcher;
mod driver;
mod reducer;
mod runtime;
mod state;

pub use action::GameAction;
pub use dispatcher::{Dispatcher, PendingRegistration, RegistrationError};
pub use driver::{Driver, DriverEvent, Intent};
pub use nebula_client::TransportEvent;
pub use reducer::reduce;
pub use runtime::Runtime;
pub use state::{CHAT_CAPACITY, GameState, LOG_CAPACITY, LogEntry, LogKind, TravelState};
