//! Property-based tests for the runtime.
//!
//! Arbitrary sequences of transport activity, timer firings and user intents
//! must never break the standard invariants, which the driver checks on
//! every render.

use std::time::Duration;

use nebula_app::{DriverEvent, Intent, Runtime, TransportEvent};
use nebula_core::{ConnectionConfig, Generation};
use nebula_harness::{InvariantRegistry, SimDriver, drain, script};
use proptest::prelude::*;

/// One step of a generated run.
#[derive(Debug, Clone)]
enum Op {
    /// Deliver an event to the transport `back` generations before the
    /// latest, so stale generations get exercised too.
    Transport { back: u64, event: TransportEvent },
    FireTimer,
    Advance(Duration),
    Input(Intent),
}

fn transport_event() -> impl Strategy<Value = TransportEvent> {
    prop_oneof![
        3 => Just(TransportEvent::Opened),
        4 => (1u64..500, 1usize..5).prop_map(|(tick, n)| {
            TransportEvent::Message(script::batch((0..n as u64).map(|i| script::tick(tick + i))))
        }),
        2 => "[a-z]{1,12}".prop_map(|body| {
            TransportEvent::Message(script::chat(&body, "sim", &body))
        }),
        1 => Just(TransportEvent::Message("not json\n{\"type\":\"tick\"}".into())),
        2 => prop::option::of(prop_oneof![Just(1000u16), Just(1006), Just(4001)])
            .prop_map(|code| TransportEvent::Closed { code }),
        1 => Just(TransportEvent::Error("reset".into())),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0u64..3, transport_event()).prop_map(|(back, event)| Op::Transport { back, event }),
        3 => Just(Op::FireTimer),
        2 => (0u64..90).prop_map(|s| Op::Advance(Duration::from_secs(s))),
        1 => prop_oneof![
            Just(Intent::Connect),
            Just(Intent::Disconnect),
            Just(Intent::Reset),
        ]
        .prop_map(Op::Input),
    ]
}

fn apply(driver: &mut SimDriver, op: Op) {
    match op {
        Op::Transport { back, event } => {
            let Some(latest) = driver.latest_generation() else {
                return;
            };
            let generation = Generation::new(latest.get().saturating_sub(back).max(1));
            driver.inject_transport(generation, event);
        },
        Op::FireTimer => {
            driver.fire_timer();
        },
        Op::Advance(by) => {
            driver.advance(by);
            driver.inject(DriverEvent::Frame);
        },
        Op::Input(intent) => driver.inject(DriverEvent::Input(intent)),
    }
}

fn run(ops: Vec<Op>) -> Runtime<SimDriver> {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        let driver = SimDriver::new().with_invariants(InvariantRegistry::standard());
        let mut runtime = Runtime::new(driver, "ws://sim/ws", ConnectionConfig::default());
        runtime.start().await.unwrap();

        for op in ops {
            apply(runtime.driver_mut(), op);
            drain(&mut runtime).await.unwrap();
        }
        runtime
    })
}

proptest! {
    /// Invariants hold under arbitrary event sequences.
    #[test]
    fn invariants_hold(ops in prop::collection::vec(op(), 0..120)) {
        let runtime = run(ops);
        prop_assert!(runtime.driver().renders() >= 1);
    }

    /// The tick shown never comes from a transport other than the live one.
    #[test]
    fn stale_ticks_never_apply(tick in 1u64..1000) {
        let ops = vec![
            Op::Transport { back: 0, event: TransportEvent::Closed { code: None } },
            Op::FireTimer,
            Op::Transport { back: 0, event: TransportEvent::Opened },
            Op::Transport { back: 1, event: TransportEvent::Message(script::tick(tick)) },
        ];
        let runtime = run(ops);
        prop_assert_eq!(runtime.dispatcher().state().tick, 0);
    }

    /// Chat never grows past its capacity however much traffic arrives.
    #[test]
    fn chat_stays_bounded(count in 190usize..260) {
        let mut ops = vec![Op::Transport { back: 0, event: TransportEvent::Opened }];
        ops.extend((0..count).map(|i| Op::Transport {
            back: 0,
            event: TransportEvent::Message(script::chat(&i.to_string(), "sim", "hi")),
        }));
        let runtime = run(ops);
        prop_assert_eq!(runtime.dispatcher().state().chat.len(), count.min(nebula_app::CHAT_CAPACITY));
    }
}
