//! Message dispatcher.
//!
//! Sits between the [`ConnectionManager`] and the reducer. Connection
//! notifications are routed into [`GameState`] as [`GameAction`]s in arrival
//! order; every other connection action is handed back to the caller to
//! execute.
//!
//! The dispatcher also resolves the registration future: `register` returns a
//! [`PendingRegistration`] that completes when the server answers with
//! `registered` (or rejects the attempt with `error`). The server's errors
//! name no command, so an `error` only rejects the registration while no
//! other command has been sent after it.

use std::{
    future::Future,
    ops::Sub,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use nebula_core::{
    ConnectionAction, ConnectionConfig, ConnectionError, ConnectionEvent, ConnectionManager,
    ConnectionStatus, Generation,
};
use nebula_proto::{ClientCommand, RegisteredPayload, ServerMessage};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::{GameAction, state::GameState};

/// Why a registration did not produce an account.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Command could not be sent.
    #[error("registration not sent: {0}")]
    NotSent(#[from] ConnectionError),

    /// Server refused the registration.
    #[error("registration rejected: {message}")]
    Rejected {
        /// Machine-readable code.
        code: String,
        /// Human-readable text.
        message: String,
    },

    /// Connection dropped or a newer registration replaced this one.
    #[error("registration cancelled")]
    Cancelled,
}

type RegistrationResult = Result<RegisteredPayload, RegistrationError>;

/// Resolves with the generated credentials once the server confirms the
/// account.
#[derive(Debug)]
pub struct PendingRegistration {
    rx: oneshot::Receiver<RegistrationResult>,
}

impl PendingRegistration {
    fn resolved(result: RegistrationResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Non-blocking check for event loops that cannot await.
    ///
    /// Returns `None` while the server has not answered yet.
    pub fn try_take(&mut self) -> Option<RegistrationResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(RegistrationError::Cancelled)),
        }
    }
}

impl Future for PendingRegistration {
    type Output = RegistrationResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(RegistrationError::Cancelled)))
    }
}

/// Registration awaiting the server's answer.
#[derive(Debug)]
struct Registration {
    tx: oneshot::Sender<RegistrationResult>,
    /// Nothing else was sent since, so an `error` can only answer this.
    sole_command: bool,
}

/// Routes connection notifications into the game state.
///
/// Generic over `Instant` like the connection manager it owns.
#[derive(Debug)]
pub struct Dispatcher<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    connection: ConnectionManager<I>,
    state: GameState,
    registration: Option<Registration>,
}

impl<I> Dispatcher<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a dispatcher for the given socket URL.
    pub fn new(url: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            connection: ConnectionManager::new(url, config),
            state: GameState::new(),
            registration: None,
        }
    }

    /// Current view model.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Underlying connection manager.
    pub fn connection(&self) -> &ConnectionManager<I> {
        &self.connection
    }

    /// Connection status for overlays.
    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// Whether a registration is awaiting the server's answer.
    pub fn registration_pending(&self) -> bool {
        self.registration.as_ref().is_some_and(|registration| !registration.tx.is_closed())
    }

    /// Open the socket.
    pub fn connect(&mut self, timestamp: u64) -> Vec<ConnectionAction> {
        let actions = self.connection.connect();
        self.route(actions, timestamp)
    }

    /// Close the socket and stop reconnecting.
    pub fn disconnect(&mut self, timestamp: u64) -> Vec<ConnectionAction> {
        let actions = self.connection.disconnect();
        self.route(actions, timestamp)
    }

    /// Send a command; dropped if the socket is not open.
    pub fn send(&mut self, command: &ClientCommand) -> Vec<ConnectionAction> {
        let actions = self.connection.send(command);
        if !actions.is_empty()
            && let Some(registration) = &mut self.registration
        {
            registration.sole_command = false;
        }
        actions
    }

    /// Send a registration and return a future for its result.
    ///
    /// A newer registration cancels the previous one.
    pub fn register(
        &mut self,
        username: impl Into<String>,
        empire: impl Into<String>,
    ) -> (Vec<ConnectionAction>, PendingRegistration) {
        let command = ClientCommand::Register { username: username.into(), empire: empire.into() };
        match self.connection.try_send(&command) {
            Ok(action) => {
                let (tx, rx) = oneshot::channel();
                self.registration = Some(Registration { tx, sole_command: true });
                (vec![action], PendingRegistration { rx })
            },
            Err(e) => {
                tracing::warn!(error = %e, "registration not sent");
                (vec![], PendingRegistration::resolved(Err(e.into())))
            },
        }
    }

    /// Apply a local action that does not come from the server.
    pub fn apply(&mut self, action: GameAction, timestamp: u64) {
        self.state.apply(action, timestamp);
    }

    /// Transport opened.
    pub fn handle_open(
        &mut self,
        generation: Generation,
        now: I,
        timestamp: u64,
    ) -> Vec<ConnectionAction> {
        let actions = self.connection.handle_open(generation, now);
        self.route(actions, timestamp)
    }

    /// Transport delivered a physical message.
    pub fn handle_message(
        &mut self,
        generation: Generation,
        text: &str,
        timestamp: u64,
    ) -> Vec<ConnectionAction> {
        let actions = self.connection.handle_message(generation, text);
        self.route(actions, timestamp)
    }

    /// Transport closed.
    pub fn handle_close(
        &mut self,
        generation: Generation,
        code: Option<u16>,
        now: I,
        timestamp: u64,
    ) -> Vec<ConnectionAction> {
        let actions = self.connection.handle_close(generation, code, now);
        self.route(actions, timestamp)
    }

    /// Transport reported an error.
    pub fn handle_error(&mut self, generation: Generation, error: &str) -> Vec<ConnectionAction> {
        self.connection.handle_error(generation, error)
    }

    /// Reconnect timer fired.
    pub fn handle_reconnect_timer(&mut self, timestamp: u64) -> Vec<ConnectionAction> {
        let actions = self.connection.handle_reconnect_timer();
        self.route(actions, timestamp)
    }

    /// Consume notifications, pass everything else through in order.
    fn route(&mut self, actions: Vec<ConnectionAction>, timestamp: u64) -> Vec<ConnectionAction> {
        let mut io = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                ConnectionAction::Notify(event) => self.dispatch(event, timestamp),
                other => io.push(other),
            }
        }
        io
    }

    fn dispatch(&mut self, event: ConnectionEvent, timestamp: u64) {
        match &event {
            ConnectionEvent::Message(ServerMessage::Registered(payload)) => {
                self.resolve_registration(Ok(payload.clone()));
            },
            ConnectionEvent::Message(ServerMessage::Error(err))
                if self.registration.is_some() && !err.is_already_logged_in() =>
            {
                let ours = self.registration.as_ref().is_some_and(|r| r.sole_command);
                if ours {
                    self.resolve_registration(Err(RegistrationError::Rejected {
                        code: err.code.clone(),
                        message: err.message.clone(),
                    }));
                } else {
                    tracing::debug!(code = %err.code, "error may answer a later command");
                }
            },
            ConnectionEvent::Disconnected(_) => {
                // Dropping the sender cancels the waiting future
                self.registration = None;
            },
            _ => {},
        }

        self.state.apply(GameAction::from(event), timestamp);
    }

    fn resolve_registration(&mut self, result: RegistrationResult) {
        if let Some(registration) = self.registration.take()
            && registration.tx.send(result).is_err()
        {
            tracing::debug!("registration result dropped, nobody waiting");
        }
    }
}

#[cfg(test)]
mod tests {
    use nebula_core::ReadyState;
    use nebula_proto::ErrorPayload;

    use super::*;

    fn open_dispatcher() -> (Dispatcher, Generation, Instant) {
        let t0 = Instant::now();
        let mut dispatcher = Dispatcher::new("ws://host/ws", ConnectionConfig::default());
        let actions = dispatcher.connect(0);
        let generation = match actions.as_slice() {
            [ConnectionAction::Open { generation, .. }] => *generation,
            other => panic!("unexpected actions {other:?}"),
        };
        dispatcher.handle_open(generation, t0, 0);
        (dispatcher, generation, t0)
    }

    #[test]
    fn messages_reach_state_in_order() {
        let (mut dispatcher, generation, _) = open_dispatcher();
        assert!(dispatcher.state().connected);

        let io = dispatcher.handle_message(
            generation,
            "{\"type\":\"tick\",\"payload\":{\"tick\":5}}\n{\"type\":\"tick\",\"payload\":{\"tick\":6}}",
            0,
        );

        assert!(io.is_empty());
        assert_eq!(dispatcher.state().tick, 6);
    }

    #[test]
    fn notifications_are_never_returned() {
        let (mut dispatcher, generation, t0) = open_dispatcher();
        let io = dispatcher.handle_close(generation, None, t0, 0);

        assert!(io.iter().all(|a| !matches!(a, ConnectionAction::Notify(_))));
        assert!(matches!(io.as_slice(), [ConnectionAction::ScheduleReconnect { .. }]));
        assert!(!dispatcher.state().connected);
    }

    #[tokio::test]
    async fn registration_resolves_with_password() {
        let (mut dispatcher, generation, _) = open_dispatcher();
        let (io, pending) = dispatcher.register("rigel", "solarian");
        assert_eq!(io.len(), 1);
        assert!(dispatcher.registration_pending());

        dispatcher.handle_message(
            generation,
            r#"{"type":"registered","payload":{"player_id":"p9","password":"hunter2"}}"#,
            0,
        );

        let registered = pending.await.unwrap();
        assert_eq!(registered.password, "hunter2");
        assert!(dispatcher.state().authenticated);
        assert!(!dispatcher.registration_pending());
    }

    #[tokio::test]
    async fn registration_rejected_by_server_error() {
        let (mut dispatcher, generation, _) = open_dispatcher();
        let (_, pending) = dispatcher.register("rigel", "solarian");

        dispatcher.handle_message(
            generation,
            r#"{"type":"error","payload":{"code":"name_taken","message":"Name taken"}}"#,
            0,
        );

        assert_eq!(pending.await, Err(RegistrationError::Rejected {
            code: "name_taken".into(),
            message: "Name taken".into(),
        }));
    }

    #[tokio::test]
    async fn error_after_other_command_leaves_registration_pending() {
        let (mut dispatcher, generation, _) = open_dispatcher();
        let (_, mut pending) = dispatcher.register("rigel", "solarian");
        let io = dispatcher.send(&ClientCommand::Mine);
        assert_eq!(io.len(), 1);

        dispatcher.handle_message(
            generation,
            r#"{"type":"error","payload":{"code":"not_docked","message":"Not docked"}}"#,
            0,
        );
        assert_eq!(pending.try_take(), None);
        assert!(dispatcher.registration_pending());

        dispatcher.handle_message(
            generation,
            r#"{"type":"registered","payload":{"player_id":"p9","password":"hunter2"}}"#,
            0,
        );
        assert_eq!(pending.await.map(|registered| registered.password), Ok("hunter2".into()));
    }

    #[tokio::test]
    async fn registration_cancelled_on_disconnect() {
        let (mut dispatcher, generation, t0) = open_dispatcher();
        let (_, pending) = dispatcher.register("rigel", "solarian");

        dispatcher.handle_close(generation, Some(1006), t0, 0);

        assert_eq!(pending.await, Err(RegistrationError::Cancelled));
    }

    #[test]
    fn registration_fails_fast_when_closed() {
        let mut dispatcher: Dispatcher = Dispatcher::new("ws://host/ws", ConnectionConfig::default());
        let (io, mut pending) = dispatcher.register("rigel", "solarian");

        assert!(io.is_empty());
        assert_eq!(
            pending.try_take(),
            Some(Err(RegistrationError::NotSent(ConnectionError::NotOpen {
                state: ReadyState::Closed
            })))
        );
    }

    #[test]
    fn already_logged_in_does_not_reject_registration() {
        let (mut dispatcher, _, _) = open_dispatcher();
        let (_, mut pending) = dispatcher.register("rigel", "solarian");

        let err = ErrorPayload { code: "already_logged_in".into(), message: String::new() };
        dispatcher.dispatch(ConnectionEvent::Message(ServerMessage::Error(err)), 0);

        assert_eq!(pending.try_take(), None);
        assert!(dispatcher.state().authenticated);
    }

    #[test]
    fn replaced_session_is_terminal() {
        let (mut dispatcher, generation, t0) = open_dispatcher();
        let io = dispatcher.handle_close(generation, Some(4001), t0, 0);

        assert!(io.is_empty());
        assert_eq!(dispatcher.status(), ConnectionStatus::Replaced);
        assert!(!dispatcher.state().connected);
    }
}
