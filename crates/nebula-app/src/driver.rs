//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from the socket, timer and
//! screen. Each frontend implements it; the generic [`crate::Runtime`] handles
//! all orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use nebula_client::TransportEvent;
use nebula_core::Generation;
use nebula_proto::{ClientCommand, RegisteredPayload};

use crate::{Dispatcher, RegistrationError};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Send a game command.
    Command(ClientCommand),
    /// Create an account and wait for the generated password.
    Register {
        /// Desired name.
        username: String,
        /// Empire to join.
        empire: String,
    },
    /// Open the socket.
    Connect,
    /// Close the socket and stop reconnecting.
    Disconnect,
    /// Drop the local view back to empty.
    Reset,
    /// Drop a pending trade without waiting for the server.
    DismissTrade {
        /// Trade id.
        trade_id: String,
    },
    /// Quit the application.
    Quit,
}

/// Input events delivered by a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// Transport activity, tagged with the transport that produced it.
    Transport {
        /// Producing transport.
        generation: Generation,
        /// What happened.
        event: TransportEvent,
    },
    /// The reconnect timer fired.
    ReconnectTimer,
    /// User input.
    Input(Intent),
    /// Animation frame or idle tick. Triggers a render.
    Frame,
}

/// Abstracts I/O operations for the runtime.
///
/// # Implementations
///
/// - **TUI**: tokio-tungstenite socket, tokio timer, ratatui screen
/// - **Simulation**: scripted transports and a virtual clock
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait for the next input event.
    ///
    /// Returns `None` if nothing arrived within the driver's frame interval.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<DriverEvent>, Self::Error>> + Send;

    /// Open a transport. Its events must carry `generation`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot even be started. The runtime
    /// treats this as an immediate close.
    fn open(&mut self, url: &str, generation: Generation) -> Result<(), Self::Error>;

    /// Detach and close a transport. No further events for `generation` may
    /// be delivered.
    fn close(&mut self, generation: Generation);

    /// Write text to the open transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Arm the reconnect timer, replacing any armed one.
    fn set_reconnect_timer(&mut self, delay: Duration);

    /// Clear the reconnect timer.
    fn cancel_reconnect_timer(&mut self);

    /// Current monotonic instant.
    fn now(&self) -> Self::Instant;

    /// Wall clock in unix milliseconds, for log timestamps.
    fn unix_millis(&self) -> u64;

    /// Render the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, dispatcher: &Dispatcher<Self::Instant>) -> Result<(), Self::Error>;

    /// Deliver the outcome of a registration.
    fn registration_complete(&mut self, result: Result<RegisteredPayload, RegistrationError>);

    /// Release all resources.
    fn stop(&mut self);
}
