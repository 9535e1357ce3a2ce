//! Generic runtime for application orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Dispatcher`]: connection manager, message routing and game state
//! - [`Driver`]: platform-specific I/O

use nebula_client::TransportEvent;
use nebula_core::{ConnectionAction, ConnectionConfig};

use crate::{
    Dispatcher, Driver, GameAction, PendingRegistration,
    driver::{DriverEvent, Intent},
};

/// Generic runtime that orchestrates the dispatcher and a driver.
pub struct Runtime<D>
where
    D: Driver,
{
    driver: D,
    dispatcher: Dispatcher<D::Instant>,
    registration: Option<PendingRegistration>,
}

impl<D> Runtime<D>
where
    D: Driver,
{
    /// Create a new runtime for the given socket URL.
    pub fn new(driver: D, url: impl Into<String>, config: ConnectionConfig) -> Self {
        Self { driver, dispatcher: Dispatcher::new(url, config), registration: None }
    }

    /// Run the main event loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        loop {
            let Some(event) = self.driver.poll_event().await? else {
                continue;
            };
            if self.step(event).await? {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Render once and open the socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.dispatcher)?;
        let timestamp = self.driver.unix_millis();
        let actions = self.dispatcher.connect(timestamp);
        self.execute(actions).await
    }

    /// Process one driver event.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self, event: DriverEvent) -> Result<bool, D::Error> {
        let now = self.driver.now();
        let timestamp = self.driver.unix_millis();

        let actions = match event {
            DriverEvent::Transport { generation, event } => match event {
                TransportEvent::Opened => self.dispatcher.handle_open(generation, now, timestamp),
                TransportEvent::Message(text) => {
                    self.dispatcher.handle_message(generation, &text, timestamp)
                },
                TransportEvent::Closed { code } => {
                    self.dispatcher.handle_close(generation, code, now, timestamp)
                },
                TransportEvent::Error(error) => self.dispatcher.handle_error(generation, &error),
            },
            DriverEvent::ReconnectTimer => self.dispatcher.handle_reconnect_timer(timestamp),
            DriverEvent::Input(intent) => match intent {
                Intent::Quit => return Ok(true),
                Intent::Command(command) => self.dispatcher.send(&command),
                Intent::Register { username, empire } => {
                    let (actions, pending) = self.dispatcher.register(username, empire);
                    self.registration = Some(pending);
                    actions
                },
                Intent::Connect => self.dispatcher.connect(timestamp),
                Intent::Disconnect => self.dispatcher.disconnect(timestamp),
                Intent::Reset => {
                    self.dispatcher.apply(GameAction::Reset, timestamp);
                    vec![]
                },
                Intent::DismissTrade { trade_id } => {
                    self.dispatcher.apply(GameAction::TradeResolved { trade_id }, timestamp);
                    vec![]
                },
            },
            DriverEvent::Frame => vec![],
        };

        self.execute(actions).await?;
        self.poll_registration();
        self.driver.render(&self.dispatcher)?;
        Ok(false)
    }

    /// Execute connection actions in order.
    async fn execute(&mut self, initial: Vec<ConnectionAction>) -> Result<(), D::Error> {
        let mut pending = initial;

        while !pending.is_empty() {
            let actions = std::mem::take(&mut pending);

            for action in actions {
                match action {
                    ConnectionAction::Open { url, generation } => {
                        if let Err(e) = self.driver.open(&url, generation) {
                            tracing::warn!(%generation, error = %e, "transport failed to start");
                            let now = self.driver.now();
                            let timestamp = self.driver.unix_millis();
                            pending.extend(
                                self.dispatcher.handle_close(generation, None, now, timestamp),
                            );
                        }
                    },
                    ConnectionAction::Close { generation } => self.driver.close(generation),
                    ConnectionAction::Send(text) => self.driver.send_text(text).await?,
                    ConnectionAction::ScheduleReconnect { delay, .. } => {
                        self.driver.set_reconnect_timer(delay);
                    },
                    ConnectionAction::CancelReconnect => self.driver.cancel_reconnect_timer(),
                    ConnectionAction::Notify(event) => {
                        tracing::warn!(?event, "unrouted notification");
                    },
                }
            }
        }
        Ok(())
    }

    fn poll_registration(&mut self) {
        let Some(pending) = self.registration.as_mut() else {
            return;
        };
        if let Some(result) = pending.try_take() {
            self.registration = None;
            self.driver.registration_complete(result);
        }
    }

    /// Get a reference to the dispatcher
    pub fn dispatcher(&self) -> &Dispatcher<D::Instant> {
        &self.dispatcher
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
