//! Battle replay screen
//!
//! Battlefield canvas with a playback bar underneath and the event feed in
//! the side column.

use nebula_render::BattleReplay;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};

use super::{canvas, split_playback, split_side, to_color};
use crate::views::{ReplayState, Views};

/// Render the replay screen body.
pub fn render(frame: &mut Frame, views: &Views, area: Rect) {
    let replay = match &views.replay {
        ReplayState::Ready(replay) => replay,
        ReplayState::Idle => {
            message(frame, area, "No battle loaded", "/battle <id> to load one", Color::DarkGray);
            return;
        },
        ReplayState::Loading { battle_id } => {
            message(frame, area, "Loading battle", battle_id, Color::Yellow);
            return;
        },
        ReplayState::Failed { battle_id, reason } => {
            let detail = format!("{battle_id}: {reason} (r to retry)");
            message(frame, area, "Battle unavailable", &detail, Color::Red);
            return;
        },
    };

    let (main_area, feed_area) = split_side(area);
    let (canvas_area, bar_area) = split_playback(main_area);

    let title = match replay.info() {
        Some(info) => format!(" Battle {} ", info.id),
        None => " Battle ".to_string(),
    };
    canvas::render(frame, &replay.scene(), views.scene_size(), &title, canvas_area);
    render_playback(frame, replay, bar_area);
    render_feed(frame, replay, feed_area);
}

fn message(frame: &mut Frame, area: Rect, title: &str, detail: &str, color: Color) {
    let text = vec![
        Line::from(Span::styled(title.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(detail.to_string()),
    ];
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Replay "));
    frame.render_widget(paragraph, area);
}

fn render_playback(frame: &mut Frame, replay: &BattleReplay, area: Rect) {
    let playback = replay.playback();
    let state = if playback.is_playing() { "playing" } else { "paused" };
    let label = format!(
        "tick {} | {}/{} | {state} | {}x",
        replay.current().tick,
        playback.index() + 1,
        playback.len(),
        playback.speed(),
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" space play, arrows step, s speed "))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(playback.position().clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_feed(frame: &mut Frame, replay: &BattleReplay, area: Rect) {
    let feed = replay.feed();
    let offset = replay.scroll().offset().min(feed.len());

    let items: Vec<ListItem> = feed
        .iter()
        .skip(offset)
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", line.tick), Style::default().fg(Color::DarkGray)),
                Span::styled(line.text.clone(), Style::default().fg(to_color(line.category.color()))),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Events "));
    frame.render_widget(list, area);
}
