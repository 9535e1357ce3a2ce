//! Play screen
//!
//! Ship and location summary on the left, event log and chat on the right.

use nebula_app::GameState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{chat, log};

const SUMMARY_WIDTH: u16 = 34;

/// Render the play screen body.
pub fn render(frame: &mut Frame, state: &GameState, area: Rect) {
    let [summary_area, right_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SUMMARY_WIDTH), Constraint::Min(20)])
        .areas(area);
    let [log_area, chat_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .areas(right_area);

    let summary = Paragraph::new(summary_lines(state))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(summary, summary_area);
    log::render(frame, state, log_area);
    chat::render(frame, state, chat_area);
}

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<9}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn summary_lines(state: &GameState) -> Vec<Line<'_>> {
    let Some(player) = &state.player else {
        return vec![
            Line::from(Span::styled("Not logged in", Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("/register <name> <empire>"),
            Line::from("/login <name> <password>"),
        ];
    };

    let mut lines = vec![
        heading(&player.username),
        field("empire", player.empire.clone()),
        field("credits", player.credits.to_string()),
    ];

    if let Some(ship) = &state.ship {
        lines.push(Line::from(""));
        lines.push(heading(&ship.name));
        lines.push(field("hull", format!("{}/{}", ship.hull, ship.max_hull)));
        lines.push(field("shield", format!("{}/{}", ship.shield, ship.max_shield)));
        lines.push(field("fuel", format!("{}/{}", ship.fuel, ship.max_fuel)));
        lines.push(field("cargo", format!("{}/{}", ship.cargo_used, ship.cargo_capacity)));
    }

    lines.push(Line::from(""));
    let system = state.system.as_ref().map_or(player.current_system.as_str(), |s| s.name.as_str());
    lines.push(field("system", system.to_string()));
    if let Some(poi) = &state.poi {
        lines.push(field("at", poi.name.clone()));
    }

    let mut flags = Vec::new();
    if state.docked {
        flags.push(Span::styled("DOCKED ", Style::default().fg(Color::Green)));
    }
    if state.in_combat {
        flags.push(Span::styled(
            "IN COMBAT ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    if !flags.is_empty() {
        lines.push(Line::from(flags));
    }

    if state.travel.is_active() {
        let destination = state.travel.destination.as_deref().unwrap_or("?");
        let mut text = format!("-> {destination}");
        if let Some(ticks) = state.ticks_to_arrival() {
            text.push_str(&format!(" in {ticks} ticks"));
            if let Some(rate) = state.tick_rate() {
                text.push_str(&format!(" (~{:.0}s)", ticks as f64 * rate));
            }
        }
        lines.push(field("travel", text));
    }

    if !state.nearby.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Nearby"));
        for entity in &state.nearby {
            let name = match &entity.clan_tag {
                Some(tag) => format!("[{tag}] {}", entity.username),
                None => entity.username.clone(),
            };
            lines.push(Line::from(format!(" {name} ({})", entity.ship_class)));
        }
    }

    if !state.pending_trades.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Trade offers"));
        for trade in &state.pending_trades {
            lines.push(Line::from(format!(
                " {} from {} ({} cr)",
                trade.trade_id, trade.counterpart, trade.offer_credits
            )));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use nebula_proto::model::{Player, TradeOffer};

    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn logged_out_suggests_commands() {
        let lines = text(&summary_lines(&GameState::new()));
        assert_eq!(lines[0], "Not logged in");
        assert!(lines.iter().any(|l| l.starts_with("/login")));
    }

    #[test]
    fn player_summary_lists_trades() {
        let mut state = GameState::new();
        state.player = Some(Player {
            username: "vega".into(),
            empire: "solarian".into(),
            credits: 1200,
            current_system: "sol".into(),
            ..Player::default()
        });
        state.docked = true;
        state.pending_trades.push(TradeOffer {
            trade_id: "t1".into(),
            counterpart: "rigel".into(),
            offer_credits: 50,
            ..TradeOffer::default()
        });

        let lines = text(&summary_lines(&state));
        insta::assert_debug_snapshot!(lines, @r#"
        [
            "vega",
            "empire   solarian",
            "credits  1200",
            "",
            "system   sol",
            "DOCKED ",
            "",
            "Trade offers",
            " t1 from rigel (50 cr)",
        ]
        "#);
    }
}
