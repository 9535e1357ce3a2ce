//! View state owned by the terminal frontend.
//!
//! The play screen renders straight from the dispatcher's game state. The
//! map and replay screens wrap the render engines and translate keys and
//! mouse cells into engine calls. Nothing here performs I/O; anything that
//! needs the network comes back as a [`ViewRequest`].

use std::time::Duration;

use nebula_app::Intent;
use nebula_proto::battle::{BattleEntry, BattleInfo};
use nebula_render::{BattleReplay, GalaxyView, Point, galaxy::overlay::OverlayConfig};
use ratatui::layout::{Position, Rect};

use crate::{
    commands::{Command, HELP},
    input::KeyInput,
    ui,
};

/// Scene units per terminal column.
pub const CELL_WIDTH: f64 = 8.0;

/// Scene units per terminal row.
pub const CELL_HEIGHT: f64 = 16.0;

/// Screen-space pan per arrow key, in scene units.
const PAN_STEP: f64 = 48.0;

/// Zoom factor per `+`/`-` key.
const ZOOM_STEP: f64 = 1.25;

/// Feed lines scrolled per key.
const FEED_SCROLL_STEP: usize = 3;

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Status, log, chat and command input.
    #[default]
    Play,
    /// Galaxy map.
    Map,
    /// Battle replay.
    Replay,
}

impl Screen {
    /// All screens in tab order.
    pub const ALL: [Self; 3] = [Self::Play, Self::Map, Self::Replay];

    /// Next screen in tab order.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Play => Self::Map,
            Self::Map => Self::Replay,
            Self::Replay => Self::Play,
        }
    }

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Map => "Map",
            Self::Replay => "Replay",
        }
    }
}

/// Battle replay lifecycle.
#[derive(Debug, Default)]
pub enum ReplayState {
    /// Nothing requested.
    #[default]
    Idle,
    /// Log pages are being fetched.
    Loading {
        /// Battle id.
        battle_id: String,
    },
    /// Replay ready to play.
    Ready(Box<BattleReplay>),
    /// Loading failed; `r` retries.
    Failed {
        /// Battle id.
        battle_id: String,
        /// Failure description.
        reason: String,
    },
}

/// Network work a view needs done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    /// Fetch the galaxy map snapshot.
    Map,
    /// Fetch POI detail for a system.
    SystemDetail(String),
    /// Fetch a battle log.
    Battle(String),
}

/// Where a submitted command line goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Hand to the runtime.
    Intent(Intent),
    /// Start a fetch.
    Request(ViewRequest),
    /// Fully handled by the views.
    Handled,
}

/// Terminal view state.
#[derive(Debug)]
pub struct Views {
    /// Visible screen.
    pub screen: Screen,
    /// Galaxy map engine.
    pub galaxy: GalaxyView,
    /// Last galaxy map fetch failure.
    pub map_error: Option<String>,
    /// Battle replay.
    pub replay: ReplayState,
    /// One-line notice for the status bar.
    pub notice: Option<String>,
    /// Canvas area on the terminal.
    canvas: Rect,
}

impl Views {
    /// Empty views.
    pub fn new(overlay: OverlayConfig) -> Self {
        let canvas = Rect::new(0, 0, 80, 24);
        let (width, height) = scene_size(canvas);
        Self {
            screen: Screen::Play,
            galaxy: GalaxyView::new(width, height, overlay),
            map_error: None,
            replay: ReplayState::Idle,
            notice: None,
            canvas,
        }
    }

    /// Set a status bar notice.
    pub fn notify(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Apply a parsed command line.
    pub fn route(&mut self, command: Command) -> Routed {
        match command {
            Command::Intent(intent) => return Routed::Intent(intent),
            Command::Show(screen) => {
                self.screen = screen;
                if screen == Screen::Map && self.galaxy.systems().is_empty() {
                    return Routed::Request(ViewRequest::Map);
                }
            },
            Command::OpenBattle { battle_id } => {
                return Routed::Request(self.begin_battle(battle_id));
            },
            Command::Track { username } => {
                if self.galaxy.overlay_mut().track(username.clone()) {
                    self.notify(format!("Tracking {username}"));
                } else {
                    self.notify(format!("Already tracking {username}"));
                }
            },
            Command::Untrack { username } => {
                self.galaxy.overlay_mut().untrack(&username);
                self.notify(format!("Stopped tracking {username}"));
            },
            Command::Help => self.notify(HELP),
            Command::Usage(usage) => self.notify(format!("usage: {usage}")),
            Command::Unknown(name) => self.notify(format!("unknown command /{name}, try /help")),
        }
        Routed::Handled
    }

    /// Fit the engines to a terminal of size `area` before drawing.
    pub fn layout(&mut self, area: Rect) {
        self.resize_canvas(ui::canvas_area(area, self.screen));
        if let ReplayState::Ready(replay) = &mut self.replay {
            let total = replay.feed().len();
            let playing = replay.playback().is_playing();
            replay.scroll_mut().sync(total, ui::feed_rows(area), playing);
        }
    }

    /// Resize both engines to the canvas at `area`.
    pub fn resize_canvas(&mut self, area: Rect) {
        let area = Rect { width: area.width.max(1), height: area.height.max(1), ..area };
        if self.canvas == area {
            return;
        }
        let resized = self.canvas.as_size() != area.as_size();
        self.canvas = area;
        if resized {
            let (width, height) = scene_size(area);
            self.galaxy.resize(width, height);
            if let ReplayState::Ready(replay) = &mut self.replay {
                replay.resize(width, height);
            }
        }
    }

    /// Canvas cell under a terminal position, if any.
    pub fn canvas_cell(&self, column: u16, row: u16) -> Option<(u16, u16)> {
        self.canvas
            .contains(Position::new(column, row))
            .then(|| (column - self.canvas.x, row - self.canvas.y))
    }

    /// Canvas size in scene units.
    pub fn scene_size(&self) -> (f64, f64) {
        scene_size(self.canvas)
    }

    /// Advance animations by one frame.
    pub fn advance(&mut self, dt: Duration) {
        self.galaxy.advance(dt);
        if let ReplayState::Ready(replay) = &mut self.replay {
            replay.advance(dt);
        }
    }

    /// Mark a battle as loading and switch to the replay screen.
    pub fn begin_battle(&mut self, battle_id: String) -> ViewRequest {
        self.screen = Screen::Replay;
        self.replay = ReplayState::Loading { battle_id: battle_id.clone() };
        ViewRequest::Battle(battle_id)
    }

    /// Deliver a battle load result. Results for a battle no longer being
    /// loaded are dropped.
    pub fn finish_battle(
        &mut self,
        battle_id: &str,
        result: Result<(Option<BattleInfo>, Vec<BattleEntry>), String>,
    ) {
        let ReplayState::Loading { battle_id: loading } = &self.replay else {
            return;
        };
        if loading != battle_id {
            tracing::debug!(battle_id, loading, "dropping stale battle load");
            return;
        }

        let (width, height) = self.scene_size();
        self.replay = match result {
            Ok((info, entries)) => match BattleReplay::new(entries, info, width, height) {
                Ok(mut replay) => {
                    replay.playback_mut().play();
                    ReplayState::Ready(Box::new(replay))
                },
                Err(e) => {
                    ReplayState::Failed { battle_id: battle_id.to_string(), reason: e.to_string() }
                },
            },
            Err(reason) => ReplayState::Failed { battle_id: battle_id.to_string(), reason },
        };
    }

    /// Keys on the map screen.
    pub fn map_key(&mut self, key: KeyInput) -> Option<ViewRequest> {
        let camera = self.galaxy.camera_mut();
        match key {
            KeyInput::Left => camera.pan_by(PAN_STEP, 0.0),
            KeyInput::Right => camera.pan_by(-PAN_STEP, 0.0),
            KeyInput::Up => camera.pan_by(0.0, PAN_STEP),
            KeyInput::Down => camera.pan_by(0.0, -PAN_STEP),
            KeyInput::Char('+' | '=') => {
                let center = camera.center();
                camera.zoom_at(center, ZOOM_STEP);
            },
            KeyInput::Char('-') => {
                let center = camera.center();
                camera.zoom_at(center, 1.0 / ZOOM_STEP);
            },
            KeyInput::Enter => {
                let id = self.galaxy.hovered()?.to_string();
                return self.galaxy.select(&id).then_some(ViewRequest::SystemDetail(id));
            },
            KeyInput::Char('r') => {
                let Some(panel) = self.galaxy.panel_mut() else {
                    return self.map_error.is_some().then_some(ViewRequest::Map);
                };
                panel.retry();
                return Some(ViewRequest::SystemDetail(panel.system_id().to_string()));
            },
            _ => {},
        }
        None
    }

    /// Pointer moved over the map canvas.
    pub fn map_hover(&mut self, cell: (u16, u16)) {
        self.galaxy.hover(cell_center(cell));
    }

    /// Click on the map canvas.
    pub fn map_click(&mut self, cell: (u16, u16)) -> Option<ViewRequest> {
        self.galaxy.click(cell_center(cell)).map(ViewRequest::SystemDetail)
    }

    /// Wheel on the map canvas. Positive `delta` zooms out.
    pub fn map_wheel(&mut self, cell: (u16, u16), delta: f64) {
        self.galaxy.camera_mut().wheel(cell_center(cell), delta);
    }

    /// Keys on the replay screen.
    pub fn replay_key(&mut self, key: KeyInput) -> Option<ViewRequest> {
        let replay = match &mut self.replay {
            ReplayState::Ready(replay) => replay,
            ReplayState::Failed { battle_id, .. } if key == KeyInput::Char('r') => {
                let battle_id = battle_id.clone();
                return Some(self.begin_battle(battle_id));
            },
            _ => return None,
        };

        let playback = replay.playback_mut();
        match key {
            KeyInput::Char(' ') => playback.toggle(),
            KeyInput::Left => playback.prev(),
            KeyInput::Right => playback.next(),
            KeyInput::Home => playback.first(),
            KeyInput::End => playback.last(),
            KeyInput::Char('s') => playback.cycle_speed(),
            KeyInput::Up | KeyInput::PageUp => replay.scroll_mut().up(FEED_SCROLL_STEP),
            KeyInput::Down | KeyInput::PageDown => replay.scroll_mut().down(FEED_SCROLL_STEP),
            _ => {},
        }
        None
    }
}

fn scene_size(area: Rect) -> (f64, f64) {
    (f64::from(area.width) * CELL_WIDTH, f64::from(area.height) * CELL_HEIGHT)
}

/// Scene point at the center of a canvas cell.
pub fn cell_center((col, row): (u16, u16)) -> Point {
    Point::new((f64::from(col) + 0.5) * CELL_WIDTH, (f64::from(row) + 0.5) * CELL_HEIGHT)
}
