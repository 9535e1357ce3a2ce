//! Seeded fault injection.
//!
//! [`ChaosNetwork`] drives a [`SimDriver`] through a random but reproducible
//! mix of handshakes, traffic, drops, session takeovers, timer firings and
//! user intents. The same seed always produces the same run.

use std::time::Duration;

use nebula_app::{DriverEvent, Intent, TransportEvent};
use nebula_core::connection::SESSION_REPLACED_CLOSE_CODE;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{script, sim_driver::SimDriver};

/// Abnormal closure code used for plain drops.
const ABNORMAL_CLOSE: u16 = 1006;

/// One thing that can happen to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The latest transport completes its handshake.
    Handshake,
    /// The server pushes a batch of frames.
    Traffic {
        /// Frames in the batch.
        frames: usize,
    },
    /// The transport drops with an abnormal close.
    Drop,
    /// The transport errors, then closes without a code.
    Error,
    /// Another session takes over the identity.
    Replace,
    /// The reconnect timer fires.
    FireTimer,
    /// Time passes with nothing happening.
    Idle(Duration),
    /// The user asks to connect.
    Connect,
    /// The user asks to disconnect.
    Disconnect,
}

/// Reproducible fault schedule.
#[derive(Debug)]
pub struct ChaosNetwork {
    rng: ChaCha8Rng,
    next_tick: u64,
    next_chat: u64,
}

impl ChaosNetwork {
    /// Schedule seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), next_tick: 1, next_chat: 1 }
    }

    /// Draw the next fault.
    pub fn next_fault(&mut self) -> Fault {
        match self.rng.gen_range(0..100) {
            0..25 => Fault::Handshake,
            25..50 => Fault::Traffic { frames: self.rng.gen_range(1..8) },
            50..60 => Fault::Drop,
            60..65 => Fault::Error,
            65..68 => Fault::Replace,
            68..85 => Fault::FireTimer,
            85..95 => Fault::Idle(Duration::from_secs(self.rng.gen_range(1..60))),
            95..98 => Fault::Connect,
            _ => Fault::Disconnect,
        }
    }

    /// Queue the events `fault` produces on `driver`.
    ///
    /// Transport faults only target a live transport. Returns `false` if
    /// the fault had nothing to act on.
    pub fn apply(&mut self, driver: &mut SimDriver, fault: &Fault) -> bool {
        let live = driver.latest_generation().filter(|g| driver.is_live(*g));

        match fault {
            Fault::FireTimer => driver.fire_timer().is_some(),
            Fault::Idle(d) => {
                driver.advance(*d);
                driver.inject(DriverEvent::Frame);
                true
            },
            Fault::Connect => {
                driver.inject(DriverEvent::Input(Intent::Connect));
                true
            },
            Fault::Disconnect => {
                driver.inject(DriverEvent::Input(Intent::Disconnect));
                true
            },
            Fault::Handshake | Fault::Traffic { .. } | Fault::Drop | Fault::Error | Fault::Replace => {
                let Some(generation) = live else {
                    return false;
                };
                for event in self.transport_events(fault) {
                    driver.inject_transport(generation, event);
                }
                true
            },
        }
    }

    fn transport_events(&mut self, fault: &Fault) -> Vec<TransportEvent> {
        match fault {
            Fault::Handshake => vec![TransportEvent::Opened],
            Fault::Traffic { frames } => {
                let text = script::batch((0..*frames).map(|_| self.next_frame()));
                vec![TransportEvent::Message(text)]
            },
            Fault::Drop => vec![TransportEvent::Closed { code: Some(ABNORMAL_CLOSE) }],
            Fault::Error => vec![
                TransportEvent::Error("connection reset".into()),
                TransportEvent::Closed { code: None },
            ],
            Fault::Replace => {
                vec![TransportEvent::Closed { code: Some(SESSION_REPLACED_CLOSE_CODE) }]
            },
            _ => vec![],
        }
    }

    /// Draw a fault and apply it.
    pub fn step(&mut self, driver: &mut SimDriver) -> Fault {
        let fault = self.next_fault();
        self.apply(driver, &fault);
        fault
    }

    fn next_frame(&mut self) -> String {
        if self.rng.gen_bool(0.7) {
            self.next_tick += 1;
            script::tick(self.next_tick)
        } else {
            self.next_chat += 1;
            script::chat(&format!("c{}", self.next_chat), "sim", "traffic")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_schedule() {
        let mut a = ChaosNetwork::new(42);
        let mut b = ChaosNetwork::new(42);
        let left: Vec<_> = (0..64).map(|_| a.next_fault()).collect();
        let right: Vec<_> = (0..64).map(|_| b.next_fault()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn transport_faults_need_a_live_transport() {
        let mut chaos = ChaosNetwork::new(1);
        let mut driver = SimDriver::new();

        assert!(!chaos.apply(&mut driver, &Fault::Handshake));
        assert!(!chaos.apply(&mut driver, &Fault::Drop));
        assert!(!driver.has_pending());

        assert!(chaos.apply(&mut driver, &Fault::Connect));
        assert!(driver.has_pending());
    }
}
