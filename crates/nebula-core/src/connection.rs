//! Game socket lifecycle state machine.
//!
//! Uses the action pattern: methods take time as input and return actions for
//! the driver to execute. The driver owns the real socket and the reconnect
//! timer; this module decides when to open, close, send, and retry.
//!
//! # State Machine
//!
//! ```text
//!            connect()               open
//! ┌────────┐ ─────────> ┌────────────┐ ────> ┌──────┐
//! │ Closed │            │ Connecting │       │ Open │
//! └────────┘ <───────── └────────────┘       └──────┘
//!     ^  │    close            ^                 │
//!     │  │                     │ reconnect timer │ close
//!     │  └── ScheduleReconnect ┘                 │
//!     └──────────────────────────────────────────┘
//! ```
//!
//! A close carrying the session-replaced code, or an explicit `disconnect()`,
//! ends automatic reconnection until the next `connect()`.

use std::{
    fmt,
    ops::Sub,
    time::{Duration, Instant},
};

use nebula_proto::{ClientCommand, ServerMessage, decode_frames, encode_command};

use crate::error::ConnectionError;

/// First reconnect delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on the reconnect delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Minimum time a connection must stay open before backoff resets.
pub const DEFAULT_STABILITY_THRESHOLD: Duration = Duration::from_secs(30);

/// Close code the server uses when another session took over this identity.
pub const SESSION_REPLACED_CLOSE_CODE: u16 = 4001;

/// Identifies one physical transport instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Wrap a raw generation number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw generation number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Socket ready state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Transport opening.
    Connecting,
    /// Transport open.
    Open,
    /// Transport closing.
    Closing,
    /// No transport.
    Closed,
}

/// Why the connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Unexpected close; a reconnect is scheduled.
    Closed {
        /// Close code, if the transport reported one.
        code: Option<u16>,
    },
    /// Another session authenticated as this identity. No reconnect.
    Replaced,
    /// Caller asked to disconnect.
    Manual,
}

/// Notification for the layer above.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Transport opened.
    Connected,
    /// A decoded server message, in arrival order.
    Message(ServerMessage),
    /// Transport went away.
    Disconnected(DisconnectReason),
}

/// Actions returned by the connection manager.
///
/// The driver executes these in order:
/// - `Open`: start a new transport tagged with `generation`
/// - `Close`: detach every handler of that transport, then close it
/// - `Send`: write the text to the open transport
/// - `ScheduleReconnect` / `CancelReconnect`: arm or clear the single timer
/// - `Notify`: hand the event to the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionAction {
    /// Open a transport.
    Open {
        /// Socket URL.
        url: String,
        /// Tag for every event this transport produces.
        generation: Generation,
    },
    /// Detach handlers and close a transport.
    Close {
        /// Transport to close.
        generation: Generation,
    },
    /// Transmit serialized text.
    Send(String),
    /// Arm the reconnect timer.
    ScheduleReconnect {
        /// Delay before the attempt.
        delay: Duration,
        /// Attempt number (1-based).
        attempt: u32,
    },
    /// Clear the reconnect timer.
    CancelReconnect,
    /// Deliver an event upward.
    Notify(ConnectionEvent),
}

/// Connection status for UI overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never connected or explicitly disconnected.
    Disconnected,
    /// First connection attempt in flight.
    Connecting,
    /// Transport open.
    Connected,
    /// Waiting to retry after an unexpected close.
    Reconnecting {
        /// Attempt number (1-based).
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },
    /// Session taken over elsewhere. Terminal until `connect()`.
    Replaced,
}

/// Connection manager configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// First reconnect delay
    pub base_delay: Duration,
    /// Reconnect delay cap
    pub max_delay: Duration,
    /// Open duration after which backoff resets
    pub stability_threshold: Duration,
    /// Close code meaning "session replaced"
    pub replaced_close_code: u16,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            stability_threshold: DEFAULT_STABILITY_THRESHOLD,
            replaced_close_code: SESSION_REPLACED_CLOSE_CODE,
        }
    }
}

impl ConnectionConfig {
    /// Delay for the given zero-based attempt counter.
    ///
    /// `min(base * 2^attempt, max)`, saturating on overflow.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Connection manager state machine.
///
/// Owns at most one transport at a time. Pure: no I/O, time passed in.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
#[derive(Debug, Clone)]
pub struct ConnectionManager<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Socket URL
    url: String,
    /// Configuration
    config: ConnectionConfig,
    /// Ready state of the current transport
    ready_state: ReadyState,
    /// Last generation handed out
    last_generation: u64,
    /// Transport currently owned. `None` when closed.
    current: Option<Generation>,
    /// Zero-based reconnect attempt counter
    attempt: u32,
    /// When the current transport opened
    opened_at: Option<I>,
    /// Reconnect timer armed
    reconnect_pending: bool,
    /// Unexpected closes schedule reconnects
    auto_reconnect: bool,
    /// UI-facing status
    status: ConnectionStatus,
}

impl<I> ConnectionManager<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a manager for the given socket URL. Nothing is opened yet.
    pub fn new(url: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            url: url.into(),
            config,
            ready_state: ReadyState::Closed,
            last_generation: 0,
            current: None,
            attempt: 0,
            opened_at: None,
            reconnect_pending: false,
            auto_reconnect: false,
            status: ConnectionStatus::Disconnected,
        }
    }

    /// Socket URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ready state of the current transport.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Transport currently owned. `None` when closed.
    #[must_use]
    pub fn current_generation(&self) -> Option<Generation> {
        self.current
    }

    /// Zero-based reconnect attempt counter.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// When the current transport opened. `None` if not open.
    #[must_use]
    pub fn last_connected(&self) -> Option<I> {
        self.opened_at
    }

    /// Whether a reconnect timer is armed.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// UI-facing status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Open a transport.
    ///
    /// No-op when already open. Otherwise tears down any previous transport,
    /// clears a pending reconnect, and opens a fresh one.
    pub fn connect(&mut self) -> Vec<ConnectionAction> {
        if self.ready_state == ReadyState::Open && self.current.is_some() {
            return vec![];
        }

        let mut actions = self.teardown();

        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        self.current = Some(generation);
        self.ready_state = ReadyState::Connecting;
        self.auto_reconnect = true;
        if !matches!(self.status, ConnectionStatus::Reconnecting { .. }) {
            self.status = ConnectionStatus::Connecting;
        }

        tracing::debug!(%generation, url = %self.url, "opening transport");
        actions.push(ConnectionAction::Open { url: self.url.clone(), generation });
        actions
    }

    /// Close the transport and stop reconnecting until `connect()`.
    pub fn disconnect(&mut self) -> Vec<ConnectionAction> {
        let had_session = self.current.is_some() || self.reconnect_pending;
        let mut actions = self.teardown();

        self.ready_state = ReadyState::Closed;
        self.auto_reconnect = false;
        self.opened_at = None;
        self.status = ConnectionStatus::Disconnected;

        if had_session {
            tracing::info!("disconnected by caller");
            actions.push(ConnectionAction::Notify(ConnectionEvent::Disconnected(
                DisconnectReason::Manual,
            )));
        }
        actions
    }

    /// Serialize and send a command.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::NotOpen` if the transport is not open
    /// - `ConnectionError::Encode` if serialization fails
    pub fn try_send(&self, command: &ClientCommand) -> Result<ConnectionAction, ConnectionError> {
        if self.ready_state != ReadyState::Open {
            return Err(ConnectionError::NotOpen { state: self.ready_state });
        }
        let text = encode_command(command)?;
        Ok(ConnectionAction::Send(text))
    }

    /// Send a command if open; drop it silently otherwise.
    pub fn send(&self, command: &ClientCommand) -> Vec<ConnectionAction> {
        match self.try_send(command) {
            Ok(action) => vec![action],
            Err(e) => {
                tracing::debug!(command = command.kind(), error = %e, "dropping command");
                vec![]
            },
        }
    }

    /// Transport reported open.
    pub fn handle_open(&mut self, generation: Generation, now: I) -> Vec<ConnectionAction> {
        if self.check_current(generation).is_err() {
            return vec![];
        }

        self.ready_state = ReadyState::Open;
        self.opened_at = Some(now);
        self.status = ConnectionStatus::Connected;

        tracing::info!(%generation, "transport open");
        vec![ConnectionAction::Notify(ConnectionEvent::Connected)]
    }

    /// Transport delivered a physical message.
    ///
    /// The text is split on newlines and each fragment decoded independently.
    pub fn handle_message(&mut self, generation: Generation, text: &str) -> Vec<ConnectionAction> {
        if self.check_current(generation).is_err() {
            return vec![];
        }

        decode_frames(text)
            .into_iter()
            .map(|msg| ConnectionAction::Notify(ConnectionEvent::Message(msg)))
            .collect()
    }

    /// Transport reported an error.
    ///
    /// Transports always follow an error with a close, which drives recovery.
    pub fn handle_error(&mut self, generation: Generation, error: &str) -> Vec<ConnectionAction> {
        if self.check_current(generation).is_ok() {
            tracing::warn!(%generation, error, "transport error");
        }
        vec![]
    }

    /// Transport closed.
    ///
    /// Schedules a reconnect unless the close code signals session
    /// replacement or the caller disconnected.
    pub fn handle_close(
        &mut self,
        generation: Generation,
        code: Option<u16>,
        now: I,
    ) -> Vec<ConnectionAction> {
        if self.check_current(generation).is_err() {
            return vec![];
        }

        self.current = None;
        self.ready_state = ReadyState::Closed;
        let opened_at = self.opened_at.take();

        if code == Some(self.config.replaced_close_code) {
            tracing::info!(%generation, "session replaced by another login");
            self.auto_reconnect = false;
            self.status = ConnectionStatus::Replaced;
            return vec![ConnectionAction::Notify(ConnectionEvent::Disconnected(
                DisconnectReason::Replaced,
            ))];
        }

        // Only a connection that stayed up long enough earns a fresh backoff
        if opened_at.is_some_and(|t| now - t >= self.config.stability_threshold) {
            self.attempt = 0;
        }

        let mut actions = vec![ConnectionAction::Notify(ConnectionEvent::Disconnected(
            DisconnectReason::Closed { code },
        ))];

        if self.auto_reconnect {
            let delay = self.config.backoff_delay(self.attempt);
            self.attempt = self.attempt.saturating_add(1);
            self.reconnect_pending = true;
            self.status = ConnectionStatus::Reconnecting { attempt: self.attempt, delay };

            tracing::info!(%generation, ?code, ?delay, attempt = self.attempt, "scheduling reconnect");
            actions.push(ConnectionAction::ScheduleReconnect { delay, attempt: self.attempt });
        } else {
            self.status = ConnectionStatus::Disconnected;
        }

        actions
    }

    /// Reconnect timer fired.
    ///
    /// Ignored if the timer was cancelled in the meantime.
    pub fn handle_reconnect_timer(&mut self) -> Vec<ConnectionAction> {
        if !self.reconnect_pending {
            return vec![];
        }
        self.reconnect_pending = false;

        if !self.auto_reconnect {
            return vec![];
        }
        self.connect()
    }

    /// Drop the current transport and any pending reconnect.
    fn teardown(&mut self) -> Vec<ConnectionAction> {
        let mut actions = Vec::new();

        if self.reconnect_pending {
            self.reconnect_pending = false;
            actions.push(ConnectionAction::CancelReconnect);
        }

        if let Some(generation) = self.current.take() {
            self.ready_state = ReadyState::Closing;
            actions.push(ConnectionAction::Close { generation });
        }

        actions
    }

    fn check_current(&self, generation: Generation) -> Result<(), ConnectionError> {
        if self.current == Some(generation) {
            return Ok(());
        }
        let err = ConnectionError::Stale { generation, current: self.current };
        tracing::debug!(error = %err, "ignoring event");
        Err(err)
    }
}
