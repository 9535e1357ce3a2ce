//! Standard invariant checks.

use std::time::Duration;

use nebula_app::{CHAT_CAPACITY, LOG_CAPACITY};
use nebula_core::{ConnectionStatus, connection::DEFAULT_MAX_DELAY};

use super::{ClientSnapshot, Invariant, InvariantResult, Violation};

/// Chat and log buffers never exceed their capacity.
pub struct BoundedBuffers;

impl Invariant for BoundedBuffers {
    fn name(&self) -> &'static str {
        "bounded_buffers"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        if state.chat_len > CHAT_CAPACITY {
            return Err(Violation {
                invariant: self.name(),
                message: format!("chat holds {} > {CHAT_CAPACITY}", state.chat_len),
            });
        }
        if state.log_ids.len() > LOG_CAPACITY {
            return Err(Violation {
                invariant: self.name(),
                message: format!("log holds {} > {LOG_CAPACITY}", state.log_ids.len()),
            });
        }
        Ok(())
    }
}

/// The newest log entry is always at the front.
///
/// Ids are assigned in insertion order, so they strictly decrease from
/// front to back.
pub struct LogNewestFirst;

impl Invariant for LogNewestFirst {
    fn name(&self) -> &'static str {
        "log_newest_first"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        for window in state.log_ids.windows(2) {
            if window[0] <= window[1] {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("log id {} precedes {}", window[0], window[1]),
                });
            }
        }
        Ok(())
    }
}

/// At most one transport is live at any time.
pub struct SingleLiveTransport;

impl Invariant for SingleLiveTransport {
    fn name(&self) -> &'static str {
        "single_live_transport"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        if state.live_transports > 1 {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} transports open", state.live_transports),
            });
        }
        Ok(())
    }
}

/// A replaced session never has a reconnect armed.
pub struct ReplacedNeverReconnects;

impl Invariant for ReplacedNeverReconnects {
    fn name(&self) -> &'static str {
        "replaced_never_reconnects"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        if state.status == ConnectionStatus::Replaced
            && let Some(delay) = state.reconnect_timer
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("replaced session has a {delay:?} reconnect armed"),
            });
        }
        Ok(())
    }
}

/// The game state's connected flag agrees with the connection status.
pub struct ConnectedMatchesStatus;

impl Invariant for ConnectedMatchesStatus {
    fn name(&self) -> &'static str {
        "connected_matches_status"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        let open = state.status == ConnectionStatus::Connected;
        if state.connected != open {
            return Err(Violation {
                invariant: self.name(),
                message: format!("connected={} but status is {:?}", state.connected, state.status),
            });
        }
        Ok(())
    }
}

/// Every scheduled reconnect delay is within the configured cap.
pub struct ReconnectDelayBounded {
    max: Duration,
}

impl ReconnectDelayBounded {
    /// Bound delays by `max`.
    pub fn new(max: Duration) -> Self {
        Self { max }
    }
}

impl Default for ReconnectDelayBounded {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELAY)
    }
}

impl Invariant for ReconnectDelayBounded {
    fn name(&self) -> &'static str {
        "reconnect_delay_bounded"
    }

    fn check(&self, state: &ClientSnapshot) -> InvariantResult {
        if let Some(delay) = state.scheduled_delays.iter().find(|d| **d > self.max) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("delay {delay:?} exceeds {:?}", self.max),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_ids_must_strictly_decrease() {
        let ok = ClientSnapshot { log_ids: vec![9, 4, 1], ..ClientSnapshot::default() };
        assert!(LogNewestFirst.check(&ok).is_ok());

        let dup = ClientSnapshot { log_ids: vec![9, 9], ..ClientSnapshot::default() };
        assert!(LogNewestFirst.check(&dup).is_err());
    }

    #[test]
    fn replaced_with_timer_is_violation() {
        let state = ClientSnapshot {
            status: ConnectionStatus::Replaced,
            reconnect_timer: Some(Duration::from_secs(1)),
            ..ClientSnapshot::default()
        };
        assert!(ReplacedNeverReconnects.check(&state).is_err());

        let reconnecting = ClientSnapshot {
            status: ConnectionStatus::Reconnecting { attempt: 1, delay: Duration::from_secs(1) },
            ..state
        };
        assert!(ReplacedNeverReconnects.check(&reconnecting).is_ok());
    }

    #[test]
    fn stale_connected_flag_is_violation() {
        let state = ClientSnapshot { connected: true, ..ClientSnapshot::default() };
        assert!(ConnectedMatchesStatus.check(&state).is_err());

        let open = ClientSnapshot { status: ConnectionStatus::Connected, ..state };
        assert!(ConnectedMatchesStatus.check(&open).is_ok());
    }

    #[test]
    fn delay_cap_is_configurable() {
        let state = ClientSnapshot {
            scheduled_delays: vec![Duration::from_secs(1), Duration::from_secs(8)],
            ..ClientSnapshot::default()
        };
        assert!(ReconnectDelayBounded::default().check(&state).is_ok());
        assert!(ReconnectDelayBounded::new(Duration::from_secs(4)).check(&state).is_err());
    }
}
