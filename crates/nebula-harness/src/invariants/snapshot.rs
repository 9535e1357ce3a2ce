//! Observable state snapshots for invariant checking.
//!
//! Invariants operate on snapshots rather than live state so every check in
//! one pass sees the same moment.

use std::time::Duration;

use nebula_app::Dispatcher;
use nebula_core::ConnectionStatus;

/// Observable state of one client after an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    /// Connection status shown to the user.
    pub status: ConnectionStatus,
    /// Game state's connected flag.
    pub connected: bool,
    /// Chat messages retained.
    pub chat_len: usize,
    /// Log entry ids, front to back.
    pub log_ids: Vec<u64>,
    /// Transports opened by the driver and not yet closed.
    pub live_transports: usize,
    /// Delay of the armed reconnect timer.
    pub reconnect_timer: Option<Duration>,
    /// Every reconnect delay scheduled so far.
    pub scheduled_delays: Vec<Duration>,
}

impl Default for ClientSnapshot {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            connected: false,
            chat_len: 0,
            log_ids: Vec::new(),
            live_transports: 0,
            reconnect_timer: None,
            scheduled_delays: Vec::new(),
        }
    }
}

impl ClientSnapshot {
    /// Capture the dispatcher's side of the snapshot. Transport fields are
    /// left for the driver to fill in.
    pub fn from_dispatcher<I>(dispatcher: &Dispatcher<I>) -> Self
    where
        I: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>,
    {
        let state = dispatcher.state();
        Self {
            status: dispatcher.status(),
            connected: state.connected,
            chat_len: state.chat.len(),
            log_ids: state.log.iter().map(|entry| entry.id).collect(),
            ..Self::default()
        }
    }
}
