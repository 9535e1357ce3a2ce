//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` stands in for the terminal driver in tests. It implements
//! [`Driver`] so the same [`nebula_app::Runtime`] orchestration code runs in
//! both production and simulation. Transports are bookkeeping only: tests
//! script what each one does by injecting [`TransportEvent`]s, and the clock
//! only moves when told to.

use std::{
    collections::{BTreeSet, VecDeque},
    time::Duration,
};

use nebula_app::{Dispatcher, Driver, DriverEvent, RegistrationError, Runtime, TransportEvent};
use nebula_core::Generation;
use nebula_proto::RegisteredPayload;
use thiserror::Error;

use crate::{
    clock::SimInstant,
    invariants::{ClientSnapshot, InvariantRegistry},
};

/// Wall clock reported at simulation start, in unix milliseconds.
pub const SIM_EPOCH_MILLIS: u64 = 1_700_000_000_000;

/// Error type for simulation driver.
#[derive(Debug, Clone, Error)]
pub enum SimDriverError {
    /// Transport open was configured to fail.
    #[error("transport refused to start: {url}")]
    OpenRefused {
        /// Requested URL.
        url: String,
    },
    /// Text written with no live transport.
    #[error("send with no live transport")]
    NotConnected,
}

/// Simulation driver for deterministic testing.
#[derive(Debug)]
pub struct SimDriver {
    pending: VecDeque<DriverEvent>,
    now: SimInstant,
    opened: Vec<(String, Generation)>,
    live: BTreeSet<Generation>,
    sent: Vec<String>,
    timer: Option<Duration>,
    scheduled: Vec<Duration>,
    renders: usize,
    registrations: Vec<Result<RegisteredPayload, RegistrationError>>,
    refuse_open: bool,
    stopped: bool,
    invariants: Option<InvariantRegistry>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            now: SimInstant::ZERO,
            opened: Vec::new(),
            live: BTreeSet::new(),
            sent: Vec::new(),
            timer: None,
            scheduled: Vec::new(),
            renders: 0,
            registrations: Vec::new(),
            refuse_open: false,
            stopped: false,
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Make every following `open` fail immediately.
    pub fn set_refuse_open(&mut self, refuse: bool) {
        self.refuse_open = refuse;
    }

    /// Queue an event for the runtime.
    pub fn inject(&mut self, event: DriverEvent) {
        self.pending.push_back(event);
    }

    /// Queue transport activity for `generation`.
    pub fn inject_transport(&mut self, generation: Generation, event: TransportEvent) {
        self.inject(DriverEvent::Transport { generation, event });
    }

    /// Queue transport activity for the most recently opened transport.
    ///
    /// Returns the generation used, or `None` if nothing was ever opened.
    pub fn inject_latest(&mut self, event: TransportEvent) -> Option<Generation> {
        let generation = self.latest_generation()?;
        self.inject_transport(generation, event);
        Some(generation)
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now.after(by);
    }

    /// Fire the armed reconnect timer, advancing the clock by its delay.
    ///
    /// Returns the delay, or `None` if no timer was armed.
    pub fn fire_timer(&mut self) -> Option<Duration> {
        let delay = self.timer.take()?;
        self.advance(delay);
        self.inject(DriverEvent::ReconnectTimer);
        Some(delay)
    }

    /// Delay of the armed reconnect timer.
    pub fn timer(&self) -> Option<Duration> {
        self.timer
    }

    /// Every reconnect delay scheduled so far, in order.
    pub fn scheduled_delays(&self) -> &[Duration] {
        &self.scheduled
    }

    /// Every transport opened so far, in order.
    pub fn opened(&self) -> &[(String, Generation)] {
        &self.opened
    }

    /// Generation of the most recently opened transport.
    pub fn latest_generation(&self) -> Option<Generation> {
        self.opened.last().map(|(_, generation)| *generation)
    }

    /// Whether `generation` is open and not yet closed.
    pub fn is_live(&self, generation: Generation) -> bool {
        self.live.contains(&generation)
    }

    /// Take all captured outgoing text.
    pub fn take_sent(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent)
    }

    /// Registration outcomes delivered so far.
    pub fn registrations(&self) -> &[Result<RegisteredPayload, RegistrationError>] {
        &self.registrations
    }

    /// Number of renders.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Whether the runtime shut the driver down.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Observable state for invariant checking.
    pub fn snapshot(&self, dispatcher: &Dispatcher<SimInstant>) -> ClientSnapshot {
        ClientSnapshot {
            live_transports: self.live.len(),
            reconnect_timer: self.timer,
            scheduled_delays: self.scheduled.clone(),
            ..ClientSnapshot::from_dispatcher(dispatcher)
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        let event = self.pending.pop_front();
        // A transport that reports its close is gone
        if let Some(DriverEvent::Transport { generation, event: TransportEvent::Closed { .. } }) =
            &event
        {
            self.live.remove(generation);
        }
        Ok(event)
    }

    fn open(&mut self, url: &str, generation: Generation) -> Result<(), Self::Error> {
        if self.refuse_open {
            return Err(SimDriverError::OpenRefused { url: url.to_string() });
        }
        tracing::debug!(%generation, url, "sim transport opened");
        self.opened.push((url.to_string(), generation));
        self.live.insert(generation);
        Ok(())
    }

    fn close(&mut self, generation: Generation) {
        tracing::debug!(%generation, "sim transport closed");
        self.live.remove(&generation);
        self.pending.retain(|event| {
            !matches!(event, DriverEvent::Transport { generation: g, .. } if *g == generation)
        });
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        if self.live.is_empty() {
            return Err(SimDriverError::NotConnected);
        }
        self.sent.push(text);
        Ok(())
    }

    fn set_reconnect_timer(&mut self, delay: Duration) {
        self.timer = Some(delay);
        self.scheduled.push(delay);
    }

    fn cancel_reconnect_timer(&mut self) {
        self.timer = None;
    }

    fn now(&self) -> SimInstant {
        self.now
    }

    fn unix_millis(&self) -> u64 {
        SIM_EPOCH_MILLIS + self.now.elapsed().as_millis() as u64
    }

    fn render(&mut self, dispatcher: &Dispatcher<SimInstant>) -> Result<(), Self::Error> {
        self.renders += 1;
        if let Some(registry) = &self.invariants {
            let snapshot = self.snapshot(dispatcher);
            registry.assert_all(&snapshot, &format!("at render {}", self.renders));
        }
        Ok(())
    }

    fn registration_complete(&mut self, result: Result<RegisteredPayload, RegistrationError>) {
        self.registrations.push(result);
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Process queued events until the queue is empty or the user quits.
///
/// Returns `true` if a quit was processed.
///
/// # Errors
///
/// Returns the first driver error the runtime surfaces.
pub async fn drain(runtime: &mut Runtime<SimDriver>) -> Result<bool, SimDriverError> {
    while let Some(event) = runtime.driver_mut().poll_event().await? {
        if runtime.step(event).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_drops_queued_events_for_that_transport() {
        let mut driver = SimDriver::new();
        driver.open("ws://sim/ws", Generation::new(1)).unwrap();
        driver.open("ws://sim/ws", Generation::new(2)).unwrap();
        driver.inject_transport(Generation::new(1), TransportEvent::Opened);
        driver.inject_transport(Generation::new(2), TransportEvent::Opened);

        driver.close(Generation::new(1));

        assert!(!driver.is_live(Generation::new(1)));
        assert_eq!(driver.pending.len(), 1);
        assert_eq!(driver.latest_generation(), Some(Generation::new(2)));
    }

    #[test]
    fn firing_timer_advances_clock() {
        let mut driver = SimDriver::new();
        driver.set_reconnect_timer(Duration::from_secs(4));

        assert_eq!(driver.fire_timer(), Some(Duration::from_secs(4)));
        assert_eq!(driver.now().elapsed(), Duration::from_secs(4));
        assert_eq!(driver.unix_millis(), SIM_EPOCH_MILLIS + 4_000);
        assert_eq!(driver.fire_timer(), None);
        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn reported_close_ends_liveness() {
        let mut driver = SimDriver::new();
        driver.open("ws://sim/ws", Generation::new(1)).unwrap();
        driver.inject_transport(Generation::new(1), TransportEvent::Closed { code: None });

        driver.poll_event().await.unwrap();

        assert!(!driver.is_live(Generation::new(1)));
    }

    #[tokio::test]
    async fn send_without_transport_fails() {
        let mut driver = SimDriver::new();
        let result = driver.send_text("{}".into()).await;
        assert!(matches!(result, Err(SimDriverError::NotConnected)));
    }
}
