//! UI rendering
//!
//! Rendering functions that convert game state and view state into terminal
//! output using ratatui widgets. All functions are pure (no I/O).

mod canvas;
mod chat;
mod input;
mod log;
mod map;
mod play;
mod replay;
mod status;

use nebula_app::GameState;
use nebula_core::ConnectionStatus;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Tabs,
};

pub use self::canvas::to_color;
use crate::{
    input::InputState,
    views::{Screen, Views},
};

const TABS_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;
const BORDER_SIZE: u16 = 2;

/// Width of the side column on the map and replay screens.
const SIDE_WIDTH: u16 = 36;

/// Height of the replay playback bar.
const PLAYBACK_HEIGHT: u16 = 3;

/// Everything one frame renders from.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    /// Game view model.
    pub state: &'a GameState,
    /// Connection status.
    pub status: ConnectionStatus,
    /// Screen state.
    pub views: &'a Views,
    /// Command line.
    pub input: &'a InputState,
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, view: &View<'_>) {
    let [tabs_area, body_area, status_area] = split_screen(frame.area());

    render_tabs(frame, view.views.screen, tabs_area);
    match view.views.screen {
        Screen::Play => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(INPUT_HEIGHT)])
                .split(body_area);
            let [main_area, input_area] = chunks.as_ref() else {
                return;
            };
            play::render(frame, view.state, *main_area);
            input::render(frame, view.input, *input_area);
        },
        Screen::Map => map::render(frame, view.views, body_area),
        Screen::Replay => replay::render(frame, view.views, body_area),
    }
    status::render(frame, view, status_area);
}

/// Inner canvas area of the map or replay screen for a terminal `area`.
pub fn canvas_area(area: Rect, screen: Screen) -> Rect {
    let [_, body, _] = split_screen(area);
    let (canvas, _) = split_side(body);
    let canvas = match screen {
        Screen::Replay => split_playback(canvas).0,
        Screen::Map | Screen::Play => canvas,
    };
    inner(canvas)
}

/// Visible feed lines on the replay screen for a terminal `area`.
pub fn feed_rows(area: Rect) -> usize {
    let [_, body, _] = split_screen(area);
    let (_, side) = split_side(body);
    usize::from(inner(side).height)
}

fn split_screen(area: Rect) -> [Rect; 3] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TABS_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area)
}

/// Canvas on the left, side column on the right.
fn split_side(area: Rect) -> (Rect, Rect) {
    let [canvas, side] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDE_WIDTH)])
        .areas(area);
    (canvas, side)
}

/// Canvas on top, playback bar below.
fn split_playback(area: Rect) -> (Rect, Rect) {
    let [canvas, bar] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(PLAYBACK_HEIGHT)])
        .areas(area);
    (canvas, bar)
}

/// Area inside a full border.
fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(BORDER_SIZE),
        height: area.height.saturating_sub(BORDER_SIZE),
    }
}

fn render_tabs(frame: &mut Frame, screen: Screen, area: Rect) {
    let titles = Screen::ALL.iter().map(|s| Line::from(format!(" {} ", s.title())));
    let selected = Screen::ALL.iter().position(|s| *s == screen).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

#[cfg(test)]
mod tests {
    use nebula_render::galaxy::overlay::OverlayConfig;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(views: &Views, state: &GameState, status: ConnectionStatus) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let input = InputState::new();
        let view = View { state, status, views, input: &input };
        terminal.draw(|frame| render(frame, &view)).unwrap();
        terminal.backend().to_string()
    }

    #[test]
    fn canvas_excludes_side_column_and_borders() {
        let area = Rect::new(0, 0, 100, 30);
        let map = canvas_area(area, Screen::Map);
        assert_eq!(map, Rect::new(1, 2, 100 - SIDE_WIDTH - 2, 30 - 2 - 2));

        let replay = canvas_area(area, Screen::Replay);
        assert_eq!(replay.height, map.height - PLAYBACK_HEIGHT);
    }

    #[test]
    fn play_screen_shows_disconnected_state() {
        let views = Views::new(OverlayConfig::default());
        let output = draw(&views, &GameState::new(), ConnectionStatus::Disconnected);

        assert!(output.contains("Play"));
        assert!(output.contains("Disconnected"));
        assert!(output.contains("Not logged in"));
    }

    #[test]
    fn replay_screen_without_battle_explains_how_to_load() {
        let mut views = Views::new(OverlayConfig::default());
        views.screen = Screen::Replay;
        let output = draw(&views, &GameState::new(), ConnectionStatus::Connected);

        assert!(output.contains("/battle <id>"));
    }
}
