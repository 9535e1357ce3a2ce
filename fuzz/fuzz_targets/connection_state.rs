//! Fuzz target for the connection state machine
//!
//! Drives a connection manager with arbitrary transport events, user intents
//! and clock jumps, including events from stale transports.
//!
//! # Invariants
//!
//! - At most one transport is live
//! - A replaced session never schedules a reconnect
//! - Reconnect delays never exceed the configured cap
//! - Events from a transport other than the current one are ignored

#![no_main]

use std::{collections::BTreeSet, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nebula_core::{
    ConnectionAction, ConnectionConfig, ConnectionManager, ConnectionStatus, Generation,
};
use nebula_harness::SimInstant;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Connect,
    Disconnect,
    Open { stale: bool },
    Message { stale: bool, text: String },
    Error { stale: bool },
    Close { stale: bool, code: Option<u16> },
    ReconnectTimer,
    Advance { secs: u8 },
}

struct Model {
    live: BTreeSet<Generation>,
    timer_armed: bool,
}

impl Model {
    fn apply(&mut self, actions: Vec<ConnectionAction>, config: &ConnectionConfig) {
        for action in actions {
            match action {
                ConnectionAction::Open { generation, .. } => {
                    self.live.insert(generation);
                },
                ConnectionAction::Close { generation } => {
                    self.live.remove(&generation);
                },
                ConnectionAction::ScheduleReconnect { delay, .. } => {
                    assert!(delay <= config.max_delay, "delay {delay:?} over cap");
                    self.timer_armed = true;
                },
                ConnectionAction::CancelReconnect => self.timer_armed = false,
                ConnectionAction::Send(_) | ConnectionAction::Notify(_) => {},
            }
        }
        assert!(self.live.len() <= 1, "live transports: {:?}", self.live);
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let config = ConnectionConfig::default();
    let mut manager = ConnectionManager::new("ws://fuzz/ws", config.clone());
    let mut model = Model { live: BTreeSet::new(), timer_armed: false };
    let mut now = SimInstant::ZERO;

    for op in ops {
        let current = manager.current_generation();
        let target = |stale: bool| match (current, stale) {
            (Some(generation), false) => generation,
            (Some(generation), true) => Generation::new(generation.get().wrapping_sub(1)),
            (None, _) => Generation::new(0),
        };
        let before = manager.status();
        let stale_target = match &op {
            Op::Open { stale }
            | Op::Error { stale }
            | Op::Close { stale, .. }
            | Op::Message { stale, .. } => *stale,
            _ => false,
        };

        let actions = match op {
            Op::Connect => manager.connect(),
            Op::Disconnect => manager.disconnect(),
            Op::Open { stale } => manager.handle_open(target(stale), now),
            Op::Message { stale, text } => manager.handle_message(target(stale), &text),
            Op::Error { stale } => manager.handle_error(target(stale), "fuzz"),
            Op::Close { stale, code } => {
                let generation = target(stale);
                if Some(generation) == current {
                    model.live.remove(&generation);
                }
                manager.handle_close(generation, code, now)
            },
            Op::ReconnectTimer => {
                model.timer_armed = false;
                manager.handle_reconnect_timer()
            },
            Op::Advance { secs } => {
                now = now.after(Duration::from_secs(u64::from(secs)));
                vec![]
            },
        };

        if stale_target && current.is_some() {
            assert!(actions.is_empty(), "stale event produced {actions:?}");
            assert_eq!(manager.status(), before);
        }

        model.apply(actions, &config);
        if manager.status() == ConnectionStatus::Replaced {
            assert!(!model.timer_armed, "replaced session armed a reconnect");
        }
    }
});
