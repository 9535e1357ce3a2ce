//! Chat area
//!
//! All channels interleaved, oldest at the top.

use nebula_app::GameState;
use nebula_proto::model::{ChatChannel, ChatMessage};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, state: &GameState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Chat ");

    let items: Vec<ListItem> = if state.chat.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        state.chat.iter().map(|msg| ListItem::new(message_line(msg))).collect()
    };

    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_line(msg: &ChatMessage) -> Line<'_> {
    let channel = match &msg.channel {
        ChatChannel::Private => match &msg.target {
            Some(target) => format!("[to {target}]"),
            None => "[whisper]".to_string(),
        },
        channel => format!("[{}]", channel.as_str()),
    };

    Line::from(vec![
        Span::styled(channel, Style::default().fg(channel_color(&msg.channel))),
        Span::raw(" "),
        Span::styled(
            format!("<{}>", msg.sender),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(msg.content.as_str()),
    ])
}

fn channel_color(channel: &ChatChannel) -> Color {
    match channel {
        ChatChannel::Local => Color::Gray,
        ChatChannel::System => Color::Cyan,
        ChatChannel::Faction => Color::Magenta,
        ChatChannel::Private => Color::Yellow,
        ChatChannel::Other(_) => Color::DarkGray,
    }
}
