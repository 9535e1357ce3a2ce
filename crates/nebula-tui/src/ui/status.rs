//! Status bar
//!
//! Displays connection status, server tick and the latest notice.

use nebula_core::ConnectionStatus;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::View;

/// Render the status bar.
pub fn render(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let mut spans = vec![Span::raw(" "), connection_span(view.status)];

    if let Some(info) = &view.state.server_info {
        spans.push(Span::styled(
            format!(" | v{} | tick {}", info.version, view.state.tick),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(notice) = &view.views.notice {
        spans.push(Span::styled(format!(" | {notice}"), Style::default().fg(Color::Yellow)));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

fn connection_span(status: ConnectionStatus) -> Span<'static> {
    match status {
        ConnectionStatus::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionStatus::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionStatus::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ConnectionStatus::Reconnecting { attempt, delay } => Span::styled(
            format!("Reconnecting in {}s (attempt {attempt})", delay.as_secs()),
            Style::default().fg(Color::Yellow),
        ),
        ConnectionStatus::Replaced => Span::styled(
            "Session replaced. /connect to resume",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn reconnecting_shows_delay_and_attempt() {
        let span = connection_span(ConnectionStatus::Reconnecting {
            attempt: 3,
            delay: Duration::from_secs(4),
        });
        assert_eq!(span.content, "Reconnecting in 4s (attempt 3)");
    }

    #[test]
    fn replaced_tells_user_how_to_resume() {
        let span = connection_span(ConnectionStatus::Replaced);
        assert!(span.content.contains("/connect"));
    }
}
