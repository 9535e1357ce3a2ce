//! Galaxy map screen
//!
//! Map canvas on the left. The side column shows the selected system's
//! points of interest with recent activity toasts underneath.

use nebula_render::galaxy::panel::PanelRow;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::{canvas, split_side, to_color};
use crate::views::Views;

const TOAST_HEIGHT: u16 = 8;

/// Render the map screen body.
pub fn render(frame: &mut Frame, views: &Views, area: Rect) {
    let (canvas_area, side_area) = split_side(area);
    let galaxy = &views.galaxy;

    let title = match galaxy.hovered().and_then(|id| galaxy.system(id)) {
        Some(system) => format!(" Galaxy | {} ", system.name),
        None => format!(" Galaxy | {} systems ", galaxy.systems().len()),
    };
    canvas::render(frame, &galaxy.scene(), views.scene_size(), &title, canvas_area);

    let [panel_area, toast_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(TOAST_HEIGHT)])
        .areas(side_area);
    render_panel(frame, views, panel_area);
    render_toasts(frame, views, toast_area);
}

fn render_panel(frame: &mut Frame, views: &Views, area: Rect) {
    let galaxy = &views.galaxy;
    let Some(panel) = galaxy.panel() else {
        let text = match &views.map_error {
            Some(error) => vec![
                Line::from(Span::styled("Map unavailable", Style::default().fg(Color::Red))),
                Line::from(error.as_str()),
            ],
            None => vec![
                Line::from("Click a system or press Enter"),
                Line::from("on the hovered one."),
                Line::from(""),
                Line::from("arrows pan, +/- zoom"),
            ],
        };
        let paragraph = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" System "));
        frame.render_widget(paragraph, area);
        return;
    };

    let name = galaxy.system(panel.system_id()).map_or(panel.system_id(), |s| s.name.as_str());
    let items: Vec<ListItem> = panel.rows().into_iter().map(|row| ListItem::new(row_line(row))).collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(format!(" {name} ")));
    frame.render_widget(list, area);
}

fn row_line(row: PanelRow<'_>) -> Line<'_> {
    match row {
        PanelRow::Heading { title, count } => Line::from(Span::styled(
            format!("{title} ({count})"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        PanelRow::Poi { poi, expanded } => {
            let marker = if expanded { "v" } else { ">" };
            Line::from(vec![
                Span::raw(format!(" {marker} ")),
                Span::raw(poi.name.as_str()),
                Span::styled(
                    format!(" {}p", poi.online),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        },
        PanelRow::Player { username, clan_tag } => {
            let name = match clan_tag {
                Some(tag) => format!("     [{tag}] {username}"),
                None => format!("     {username}"),
            };
            Line::from(Span::styled(name, Style::default().fg(Color::Gray)))
        },
        PanelRow::Loading => Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow))),
        PanelRow::Failed { reason } => Line::from(vec![
            Span::styled("Failed: ", Style::default().fg(Color::Red)),
            Span::raw(reason),
            Span::styled(" (r to retry)", Style::default().fg(Color::DarkGray)),
        ]),
        PanelRow::Empty => {
            Line::from(Span::styled("No points of interest", Style::default().fg(Color::DarkGray)))
        },
    }
}

fn render_toasts(frame: &mut Frame, views: &Views, area: Rect) {
    let items: Vec<ListItem> = views
        .galaxy
        .overlay()
        .toasts()
        .map(|toast| {
            ListItem::new(Line::from(Span::styled(
                toast.text.as_str(),
                Style::default().fg(to_color(toast.kind.color())),
            )))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Activity "));
    frame.render_widget(list, area);
}
