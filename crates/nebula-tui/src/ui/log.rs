//! Event log
//!
//! Newest entries first, colored by category.

use nebula_app::{GameState, LogKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the event log.
pub fn render(frame: &mut Frame, state: &GameState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    let visible = usize::from(area.height.saturating_sub(BORDER_SIZE));

    let items: Vec<ListItem> = state
        .log
        .iter()
        .take(visible)
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>7} ", entry.kind.label()),
                    Style::default().fg(kind_color(entry.kind)),
                ),
                Span::raw(entry.message.clone()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn kind_color(kind: LogKind) -> Color {
    match kind {
        LogKind::System => Color::Cyan,
        LogKind::Info => Color::Gray,
        LogKind::Travel => Color::Blue,
        LogKind::Combat | LogKind::Error => Color::Red,
        LogKind::Mining => Color::Yellow,
        LogKind::Trade => Color::Green,
        LogKind::Skill => Color::Magenta,
        LogKind::Scan => Color::LightCyan,
        LogKind::Police => Color::LightBlue,
    }
}
