//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard and mouse events and ratatui for rendering. The game socket runs
//! on tokio-tungstenite; map, system and battle data come over REST and are
//! fetched on spawned tasks whose results flow back through a channel.

use std::{
    future::pending,
    io::{self, Stdout, stdout},
    pin::Pin,
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use nebula_app::{Dispatcher, Driver, DriverEvent, Intent, RegistrationError, TransportEvent};
use nebula_client::{
    ClientConfig, SocketEvent, TransportError, activity::ActivityStream, api::ApiClient,
    socket::Socket,
};
use nebula_core::Generation;
use nebula_proto::{
    RegisteredPayload,
    battle::{BattleEntry, BattleInfo},
    map::{GalaxyMap, SystemDetail},
};
use nebula_render::{DEFAULT_PAGE_SIZE, galaxy::overlay::OverlayConfig, load_battle};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior, Sleep},
};

use crate::{
    commands,
    input::{InputState, KeyInput},
    ui,
    views::{Routed, Screen, ViewRequest, Views},
};

/// Redraw interval for animations.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// A finished REST fetch.
enum Fetched {
    Map(Result<GalaxyMap, String>),
    System { system_id: String, result: Result<SystemDetail, String> },
    Battle { battle_id: String, result: Result<(Option<BattleInfo>, Vec<BattleEntry>), String> },
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the screen, the command line, the view engines and every network
/// task. Only the socket whose generation matches the live [`Socket`] may
/// deliver transport events.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    input: InputState,
    views: Views,
    api: ApiClient,
    socket: Option<Socket>,
    socket_tx: mpsc::UnboundedSender<SocketEvent>,
    socket_rx: mpsc::UnboundedReceiver<SocketEvent>,
    fetch_tx: mpsc::UnboundedSender<Fetched>,
    fetch_rx: mpsc::UnboundedReceiver<Fetched>,
    activity: ActivityStream,
    reconnect: Option<Pin<Box<Sleep>>>,
    frame: Interval,
    map_refresh: Interval,
    last_frame: Instant,
}

impl TerminalDriver {
    /// Enter the alternate screen and start the background streams.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: ClientConfig, overlay: OverlayConfig) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(EnableMouseCapture)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let api = ApiClient::new(config);
        let activity = ActivityStream::spawn(
            api.http().clone(),
            api.config().activity_url(),
            overlay.activity_retry_delay,
        );

        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        let mut frame = tokio::time::interval(FRAME_INTERVAL);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut map_refresh = tokio::time::interval(api.config().map_refresh);
        map_refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            input: InputState::new(),
            views: Views::new(overlay),
            api,
            socket: None,
            socket_tx,
            socket_rx,
            fetch_tx,
            fetch_rx,
            activity,
            reconnect: None,
            frame,
            map_refresh,
            last_frame: Instant::now(),
        })
    }

    /// Load a battle as soon as the loop starts.
    pub fn open_battle(&mut self, battle_id: String) {
        let request = self.views.begin_battle(battle_id);
        self.spawn_fetch(request);
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            KeyCode::PageUp => Some(KeyInput::PageUp),
            KeyCode::PageDown => Some(KeyInput::PageDown),
            _ => None,
        }
    }

    fn handle_key(&mut self, event: KeyEvent) -> Option<DriverEvent> {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(DriverEvent::Input(Intent::Quit));
        }
        let key = Self::convert_key(event.code)?;

        match (self.views.screen, key) {
            (_, KeyInput::Tab) => self.views.screen = self.views.screen.next(),
            (Screen::Map | Screen::Replay, KeyInput::Esc) => self.views.screen = Screen::Play,
            (Screen::Play, KeyInput::Esc) => self.views.notice = None,
            (Screen::Play, key) => {
                let Some(line) = self.input.handle_key(key) else {
                    return Some(DriverEvent::Frame);
                };
                return match self.views.route(commands::parse(&line)) {
                    Routed::Intent(intent) => Some(DriverEvent::Input(intent)),
                    Routed::Request(request) => {
                        self.spawn_fetch(request);
                        Some(DriverEvent::Frame)
                    },
                    Routed::Handled => Some(DriverEvent::Frame),
                };
            },
            (Screen::Map, key) => {
                if let Some(request) = self.views.map_key(key) {
                    self.spawn_fetch(request);
                }
            },
            (Screen::Replay, key) => {
                if let Some(request) = self.views.replay_key(key) {
                    self.spawn_fetch(request);
                }
            },
        }
        if self.views.screen == Screen::Map && self.views.galaxy.systems().is_empty() {
            self.spawn_fetch(ViewRequest::Map);
        }
        Some(DriverEvent::Frame)
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Option<DriverEvent> {
        if self.views.screen != Screen::Map {
            return None;
        }
        let cell = self.views.canvas_cell(event.column, event.row)?;

        match event.kind {
            MouseEventKind::Moved => self.views.map_hover(cell),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(request) = self.views.map_click(cell) {
                    self.spawn_fetch(request);
                }
            },
            MouseEventKind::ScrollUp => self.views.map_wheel(cell, -1.0),
            MouseEventKind::ScrollDown => self.views.map_wheel(cell, 1.0),
            _ => return None,
        }
        Some(DriverEvent::Frame)
    }

    fn handle_terminal(&mut self, event: Event) -> Option<DriverEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(..) => Some(DriverEvent::Frame),
            _ => None,
        }
    }

    fn handle_fetched(&mut self, fetched: Fetched) {
        match fetched {
            Fetched::Map(Ok(map)) => {
                tracing::debug!(systems = map.systems.len(), "galaxy map loaded");
                self.views.map_error = None;
                self.views.galaxy.set_map(map);
            },
            Fetched::Map(Err(reason)) => {
                tracing::warn!(%reason, "galaxy map fetch failed");
                self.views.map_error = Some(reason);
            },
            Fetched::System { system_id, result } => {
                self.views.galaxy.resolve_detail(&system_id, result);
            },
            Fetched::Battle { battle_id, result } => self.views.finish_battle(&battle_id, result),
        }
    }

    fn spawn_fetch(&self, request: ViewRequest) {
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            let fetched = match request {
                ViewRequest::Map => Fetched::Map(api.galaxy_map().await.map_err(|e| e.to_string())),
                ViewRequest::SystemDetail(system_id) => {
                    let result = api.system_detail(&system_id).await.map_err(|e| e.to_string());
                    Fetched::System { system_id, result }
                },
                ViewRequest::Battle(battle_id) => {
                    let result = fetch_battle(&api, &battle_id).await;
                    Fetched::Battle { battle_id, result }
                },
            };
            // The driver may already be gone.
            let _ = tx.send(fetched);
        });
    }

    fn live_generation(&self) -> Option<Generation> {
        self.socket.as_ref().map(Socket::generation)
    }
}

async fn fetch_battle(
    api: &ApiClient,
    battle_id: &str,
) -> Result<(Option<BattleInfo>, Vec<BattleEntry>), String> {
    // Metadata only anchors the viewport; the log alone is enough to play.
    let info = match api.battle_info(battle_id).await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(battle_id, error = %e, "battle metadata unavailable");
            None
        },
    };
    let entries =
        load_battle(api, battle_id, DEFAULT_PAGE_SIZE).await.map_err(|e| e.to_string())?;
    Ok((info, entries))
}

/// Resolves when the armed timer fires. Never resolves when disarmed.
async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.await,
        None => pending().await,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        let live = self.live_generation();

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => match maybe_event {
                Some(Ok(event)) => Ok(self.handle_terminal(event)),
                Some(Err(e)) => Err(TerminalError::Io(e)),
                None => Ok(Some(DriverEvent::Input(Intent::Quit))),
            },

            // Socket events from the live transport only
            Some(SocketEvent { generation, event }) = self.socket_rx.recv() => {
                if Some(generation) != live {
                    tracing::trace!(%generation, "dropping event from detached socket");
                    return Ok(None);
                }
                if matches!(event, TransportEvent::Closed { .. }) {
                    self.socket = None;
                }
                Ok(Some(DriverEvent::Transport { generation, event }))
            },

            () = fire(&mut self.reconnect) => {
                self.reconnect = None;
                Ok(Some(DriverEvent::ReconnectTimer))
            },

            Some(fetched) = self.fetch_rx.recv() => {
                self.handle_fetched(fetched);
                Ok(Some(DriverEvent::Frame))
            },

            Some(activity) = self.activity.recv() => {
                self.views.galaxy.push_activity(&activity);
                Ok(Some(DriverEvent::Frame))
            },

            _ = self.map_refresh.tick() => {
                self.spawn_fetch(ViewRequest::Map);
                Ok(None)
            },

            _ = self.frame.tick() => {
                let now = Instant::now();
                self.views.advance(now - self.last_frame);
                self.last_frame = now;
                Ok(Some(DriverEvent::Frame))
            },
        }
    }

    fn open(&mut self, url: &str, generation: Generation) -> Result<(), Self::Error> {
        if let Some(previous) = self.socket.take() {
            tracing::warn!(generation = %previous.generation(), "replacing socket that was never closed");
            previous.abort();
        }
        tracing::info!(%generation, url, "opening socket");
        self.socket = Some(Socket::open(url, generation, self.socket_tx.clone()));
        Ok(())
    }

    fn close(&mut self, generation: Generation) {
        if self.live_generation() == Some(generation)
            && let Some(socket) = self.socket.take()
        {
            tracing::info!(%generation, "closing socket");
            socket.close();
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        let Some(socket) = &self.socket else {
            return Err(TerminalError::Transport(TransportError::Closed));
        };
        // A dead task has already queued its close; the runtime learns from that.
        if let Err(e) = socket.send(text) {
            tracing::warn!(generation = %socket.generation(), error = %e, "dropping write to closed socket");
        }
        Ok(())
    }

    fn set_reconnect_timer(&mut self, delay: Duration) {
        self.reconnect = Some(Box::pin(tokio::time::sleep(delay)));
    }

    fn cancel_reconnect_timer(&mut self) {
        self.reconnect = None;
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn unix_millis(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    fn render(&mut self, dispatcher: &Dispatcher<Self::Instant>) -> Result<(), Self::Error> {
        let size = self.terminal.size()?;
        self.views.layout(Rect::new(0, 0, size.width, size.height));

        let view = ui::View {
            state: dispatcher.state(),
            status: dispatcher.status(),
            views: &self.views,
            input: &self.input,
        };
        self.terminal.draw(|frame| ui::render(frame, &view))?;
        Ok(())
    }

    fn registration_complete(&mut self, result: Result<RegisteredPayload, RegistrationError>) {
        match result {
            Ok(registered) => {
                tracing::info!(player_id = %registered.player_id, "account created");
                self.views.notify(format!(
                    "Account created. Password: {} (save it, it is shown once)",
                    registered.password
                ));
            },
            Err(e) => self.views.notify(e.to_string()),
        }
    }

    fn stop(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.close();
        }
        self.reconnect = None;
        self.activity.close();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = stdout().execute(DisableMouseCapture);
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
