//! Human-readable battle event feed.

use std::collections::HashMap;

use nebula_proto::battle::{BattleEntry, BattleEvent};

use crate::scene::Color;

/// Category of a feed line, used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedCategory {
    /// Participant joined.
    Join,
    /// Stance change.
    Stance,
    /// Zone movement.
    Movement,
    /// Shot that connected.
    Hit,
    /// Shot that missed.
    Miss,
    /// Shield regeneration.
    Regen,
    /// Flee attempt.
    Flee,
    /// Participant destroyed.
    Kill,
    /// Battle finished.
    End,
}

impl FeedCategory {
    /// Display color.
    pub fn color(self) -> Color {
        match self {
            Self::Join => Color::CYAN,
            Self::Stance => Color::PURPLE,
            Self::Movement => Color::BLUE,
            Self::Hit => Color::ORANGE,
            Self::Miss => Color::GRAY,
            Self::Regen => Color::GREEN,
            Self::Flee => Color::YELLOW,
            Self::Kill => Color::RED,
            Self::End => Color::WHITE,
        }
    }
}

/// One line of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedLine {
    /// Tick the event happened on.
    pub tick: u64,
    /// Category.
    pub category: FeedCategory,
    /// Display text.
    pub text: String,
}

/// Player id to display name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Names(HashMap<String, String>);

impl Names {
    /// Collect every username the battle mentions.
    pub fn of_battle(entries: &[BattleEntry]) -> Self {
        let names = entries
            .iter()
            .flat_map(|e| e.participants.iter())
            .filter_map(|p| Some((p.player_id.clone(), p.username.clone()?)))
            .collect();
        Self(names)
    }

    /// Display name for `player_id`; the id itself when unknown.
    pub fn get<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.0.get(player_id).map_or(player_id, String::as_str)
    }
}

/// Translate one event into a feed line. Unknown events produce nothing.
pub fn describe(tick: u64, event: &BattleEvent, names: &Names) -> Option<FeedLine> {
    let (category, text) = match event {
        BattleEvent::Join { player_id, side } => {
            let name = names.get(player_id);
            let text = match side {
                Some(side) => format!("{name} joined the battle on side {side}"),
                None => format!("{name} joined the battle"),
            };
            (FeedCategory::Join, text)
        },
        BattleEvent::StanceChange { player_id, stance } => {
            (FeedCategory::Stance, format!("{} switched to {stance} stance", names.get(player_id)))
        },
        BattleEvent::ZoneMove { player_id, from_zone, to_zone } => {
            let name = names.get(player_id);
            let text = match from_zone {
                Some(from) => format!("{name} moved from {from} to {to_zone}"),
                None => format!("{name} moved to {to_zone}"),
            };
            (FeedCategory::Movement, text)
        },
        BattleEvent::Attack { attacker_id, target_id, damage, hit, weapon } => {
            let attacker = names.get(attacker_id);
            let target = names.get(target_id);
            let mut text = if *hit {
                format!("{attacker} hit {target} for {damage} damage")
            } else {
                format!("{attacker} missed {target}")
            };
            if let Some(weapon) = weapon {
                text.push_str(&format!(" with {weapon}"));
            }
            (if *hit { FeedCategory::Hit } else { FeedCategory::Miss }, text)
        },
        BattleEvent::Regen { player_id, shield } => {
            (FeedCategory::Regen, format!("{} regenerated {shield} shield", names.get(player_id)))
        },
        BattleEvent::Flee { player_id, success } => {
            let name = names.get(player_id);
            let text = if *success {
                format!("{name} escaped the battle")
            } else {
                format!("{name} failed to flee")
            };
            (FeedCategory::Flee, text)
        },
        BattleEvent::Kill { killer_id, victim_id } => (
            FeedCategory::Kill,
            format!("{} destroyed {}", names.get(killer_id), names.get(victim_id)),
        ),
        BattleEvent::BattleEnd { winner, summary } => {
            let mut text = summary.clone().unwrap_or_else(|| "Battle ended".to_string());
            if let Some(winner) = winner {
                text.push_str(&format!(": {winner} wins"));
            }
            (FeedCategory::End, text)
        },
        BattleEvent::Unknown => return None,
    };
    Some(FeedLine { tick, category, text })
}

/// Every line from the first entry through `entries[index]` inclusive.
pub fn lines_through(entries: &[BattleEntry], index: usize, names: &Names) -> Vec<FeedLine> {
    entries
        .iter()
        .take(index.saturating_add(1))
        .flat_map(|entry| entry.events.iter().filter_map(|ev| describe(entry.tick, ev, names)))
        .collect()
}

/// Scroll position of the feed panel.
///
/// Follows the newest line while the replay plays; manual scrolling is kept
/// while paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedScroll {
    offset: usize,
}

impl FeedScroll {
    /// First visible line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Clamp to the content and pin to the bottom while `playing`.
    pub fn sync(&mut self, total: usize, visible: usize, playing: bool) {
        let bottom = total.saturating_sub(visible);
        self.offset = if playing { bottom } else { self.offset.min(bottom) };
    }

    /// Scroll toward older lines.
    pub fn up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Scroll toward newer lines. Clamped on the next [`Self::sync`].
    pub fn down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
    }
}
