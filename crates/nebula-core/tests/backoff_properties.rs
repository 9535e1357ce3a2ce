//! Property-based tests for the connection manager.
//!
//! Drives the manager with arbitrary open/close sequences and checks the
//! reconnect schedule, the stability reset, and generation isolation.

use std::time::{Duration, Instant};

use nebula_core::{
    ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionStatus,
    DisconnectReason, Generation,
};
use proptest::prelude::*;

/// One lifecycle of a transport: how long it stayed open, and whether it
/// opened at all.
#[derive(Debug, Clone, Copy)]
struct Session {
    opened: bool,
    uptime_secs: u64,
}

fn session_strategy() -> impl Strategy<Value = Session> {
    (any::<bool>(), 0u64..90).prop_map(|(opened, uptime_secs)| Session { opened, uptime_secs })
}

fn open_generation(actions: &[ConnectionAction]) -> Option<Generation> {
    actions.iter().find_map(|a| match a {
        ConnectionAction::Open { generation, .. } => Some(*generation),
        _ => None,
    })
}

fn scheduled_delay(actions: &[ConnectionAction]) -> Option<Duration> {
    actions.iter().find_map(|a| match a {
        ConnectionAction::ScheduleReconnect { delay, .. } => Some(*delay),
        _ => None,
    })
}

/// Reference model of the reconnect delay.
fn model_delay(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX).min(30);
    Duration::from_secs(secs)
}

proptest! {
    #[test]
    fn prop_delay_follows_backoff_model(sessions in prop::collection::vec(session_strategy(), 1..40)) {
        let config = ConnectionConfig::default();
        let threshold = config.stability_threshold;
        let mut conn: ConnectionManager = ConnectionManager::new("ws://host/ws", config);
        let mut now = Instant::now();
        let mut model_attempt = 0u32;

        let mut actions = conn.connect();
        for session in sessions {
            let generation = open_generation(&actions).unwrap();
            let uptime = Duration::from_secs(session.uptime_secs);

            if session.opened {
                conn.handle_open(generation, now);
                if uptime >= threshold {
                    model_attempt = 0;
                }
            }
            now += uptime;

            let closed = conn.handle_close(generation, Some(1006), now);
            let delay = scheduled_delay(&closed).unwrap();
            prop_assert_eq!(delay, model_delay(model_attempt));
            prop_assert!(delay <= Duration::from_secs(30));
            model_attempt += 1;

            now += delay;
            actions = conn.handle_reconnect_timer();
        }
    }

    #[test]
    fn prop_replaced_close_never_schedules(attempts in 0usize..10) {
        let mut conn: ConnectionManager =
            ConnectionManager::new("ws://host/ws", ConnectionConfig::default());
        let t0 = Instant::now();

        let mut actions = conn.connect();
        for _ in 0..attempts {
            let generation = open_generation(&actions).unwrap();
            conn.handle_close(generation, None, t0);
            actions = conn.handle_reconnect_timer();
        }

        let generation = open_generation(&actions).unwrap();
        conn.handle_open(generation, t0);
        let closed = conn.handle_close(generation, Some(4001), t0);

        prop_assert_eq!(scheduled_delay(&closed), None);
        prop_assert!(closed.contains(&ConnectionAction::Notify(ConnectionEvent::Disconnected(
            DisconnectReason::Replaced
        ))));
        prop_assert_eq!(conn.status(), ConnectionStatus::Replaced);
        prop_assert!(conn.handle_reconnect_timer().is_empty());
    }

    #[test]
    fn prop_only_current_generation_is_heard(extra_connects in 1usize..6) {
        let mut conn: ConnectionManager =
            ConnectionManager::new("ws://host/ws", ConnectionConfig::default());
        let t0 = Instant::now();

        let mut stale = Vec::new();
        let mut current = open_generation(&conn.connect()).unwrap();
        for _ in 0..extra_connects {
            stale.push(current);
            current = open_generation(&conn.connect()).unwrap();
        }

        let tick_msg = r#"{"type":"tick","payload":{"tick":1}}"#;
        for generation in stale {
            prop_assert!(conn.handle_open(generation, t0).is_empty());
            prop_assert!(conn.handle_message(generation, tick_msg).is_empty());
            prop_assert!(conn.handle_close(generation, None, t0).is_empty());
        }
        prop_assert_eq!(conn.current_generation(), Some(current));
        prop_assert!(!conn.reconnect_pending());
    }
}
