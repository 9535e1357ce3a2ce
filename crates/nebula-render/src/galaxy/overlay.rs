//! Live activity overlay.
//!
//! Activity events become short-lived toasts. Events about tracked players
//! also start a ping animation at the relevant system and extend the
//! player's rolling travel history.
//!
//! Time is animation time: a [`Duration`] since the map started, supplied by
//! the caller on every call.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::Duration,
};

use nebula_proto::activity::ActivityEvent;

use crate::scene::Color;

/// Visits remembered per tracked player.
pub const TRAVEL_HISTORY_CAP: usize = 5;

/// Rings drawn per ping.
pub const PING_RINGS: usize = 3;

/// Overlay timing configuration.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Toast lifetime
    pub toast_duration: Duration,
    /// Ping animation length
    pub ping_duration: Duration,
    /// Delay before reopening a failed activity stream
    pub activity_retry_delay: Duration,
    /// Toasts visible at once
    pub max_toasts: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            toast_duration: Duration::from_secs(5),
            ping_duration: Duration::from_secs(3),
            activity_retry_delay: Duration::from_secs(5),
            max_toasts: 5,
        }
    }
}

/// Kind of activity, for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Player came online.
    Joined,
    /// Combat.
    Combat,
    /// Travel or jump.
    Movement,
    /// Destruction.
    Destruction,
    /// Discovery.
    Discovery,
}

impl ActivityKind {
    /// Display color.
    pub fn color(self) -> Color {
        match self {
            Self::Joined => Color::GREEN,
            Self::Combat => Color::ORANGE,
            Self::Movement => Color::CYAN,
            Self::Destruction => Color::RED,
            Self::Discovery => Color::PURPLE,
        }
    }
}

/// Short-lived notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// Unique id.
    pub id: u64,
    /// Text.
    pub text: String,
    /// Category.
    pub kind: ActivityKind,
    /// Creation time.
    pub created: Duration,
}

/// Expanding-ring animation at a system.
#[derive(Debug, Clone, PartialEq)]
pub struct Ping {
    /// System the ping is drawn at.
    pub system_id: String,
    /// Category.
    pub kind: ActivityKind,
    /// Start time.
    pub started: Duration,
}

/// Animation frame of one ping ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    /// Ring progress in `[0, 1]`.
    pub progress: f64,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl Ping {
    /// Overall progress in `[0, 1]`.
    pub fn progress(&self, now: Duration, duration: Duration) -> f64 {
        let age = now.saturating_sub(self.started).as_secs_f64();
        let total = duration.as_secs_f64();
        if total <= 0.0 { 1.0 } else { (age / total).clamp(0.0, 1.0) }
    }

    /// Staggered ring frames. Rings that have not started yet are omitted.
    pub fn rings(&self, now: Duration, duration: Duration) -> Vec<RingFrame> {
        let p = self.progress(now, duration);
        // Each ring runs for half of the ping, offset by a quarter
        (0..PING_RINGS)
            .filter_map(|i| {
                let local = (p - i as f64 * 0.25) / 0.5;
                (0.0..=1.0).contains(&local).then_some(RingFrame { progress: local, alpha: 1.0 - local })
            })
            .collect()
    }

    /// Opacity of the central flash.
    pub fn flash_alpha(&self, now: Duration, duration: Duration) -> f64 {
        (1.0 - self.progress(now, duration) / 0.3).max(0.0)
    }
}

/// Toasts, pings and travel history.
#[derive(Debug, Clone, Default)]
pub struct ActivityOverlay {
    config: OverlayConfig,
    toasts: VecDeque<Toast>,
    pings: Vec<Ping>,
    tracked: HashSet<String>,
    history: HashMap<String, VecDeque<String>>,
    next_toast_id: u64,
}

impl ActivityOverlay {
    /// Create an empty overlay.
    pub fn new(config: OverlayConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Start tracking a player. Returns `false` if already tracked.
    pub fn track(&mut self, username: impl Into<String>) -> bool {
        self.tracked.insert(username.into())
    }

    /// Stop tracking a player and forget their history.
    pub fn untrack(&mut self, username: &str) {
        self.tracked.remove(username);
        self.history.remove(username);
    }

    /// Whether a player is tracked.
    pub fn is_tracked(&self, username: &str) -> bool {
        self.tracked.contains(username)
    }

    /// Tracked player names.
    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(String::as_str)
    }

    /// Recent systems visited by a tracked player, oldest first.
    pub fn history(&self, username: &str) -> Option<&VecDeque<String>> {
        self.history.get(username)
    }

    /// Visible toasts, oldest first.
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    /// Running pings.
    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    /// Dismiss a toast before it expires.
    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Handle one activity event.
    pub fn push(&mut self, event: &ActivityEvent, now: Duration) {
        let Some((kind, text)) = describe(event) else {
            tracing::debug!("ignoring unknown activity event");
            return;
        };

        self.next_toast_id += 1;
        self.toasts.push_back(Toast { id: self.next_toast_id, text, kind, created: now });
        while self.toasts.len() > self.config.max_toasts {
            self.toasts.pop_front();
        }

        let Some(username) = event.username().filter(|u| self.tracked.contains(*u)) else {
            return;
        };
        let username = username.to_string();

        if let ActivityEvent::Jump { from_system, .. } = event {
            self.record_visit(&username, from_system);
        }
        if let Some(system_id) = event.system_id().filter(|s| !s.is_empty()) {
            self.record_visit(&username, system_id);
            self.pings.push(Ping { system_id: system_id.to_string(), kind, started: now });
        }
    }

    /// Drop expired toasts and finished pings.
    pub fn prune(&mut self, now: Duration) {
        let toast_ttl = self.config.toast_duration;
        let ping_ttl = self.config.ping_duration;
        self.toasts.retain(|t| now.saturating_sub(t.created) < toast_ttl);
        self.pings.retain(|p| now.saturating_sub(p.started) < ping_ttl);
    }

    fn record_visit(&mut self, username: &str, system_id: &str) {
        if system_id.is_empty() {
            return;
        }
        let visits = self.history.entry(username.to_string()).or_default();
        if visits.back().is_some_and(|last| last == system_id) {
            return;
        }
        visits.push_back(system_id.to_string());
        while visits.len() > TRAVEL_HISTORY_CAP {
            visits.pop_front();
        }
    }
}

/// Toast text for an activity event.
fn describe(event: &ActivityEvent) -> Option<(ActivityKind, String)> {
    let described = match event {
        ActivityEvent::PlayerJoined { username, .. } => {
            (ActivityKind::Joined, format!("{username} came online"))
        },
        ActivityEvent::Combat { attacker, target, .. } => {
            (ActivityKind::Combat, format!("{attacker} attacked {target}"))
        },
        ActivityEvent::Travel { username, poi_name, .. } => match poi_name {
            Some(poi) => (ActivityKind::Movement, format!("{username} travelled to {poi}")),
            None => (ActivityKind::Movement, format!("{username} is travelling")),
        },
        ActivityEvent::Jump { username, to_system, .. } => {
            (ActivityKind::Movement, format!("{username} jumped to {to_system}"))
        },
        ActivityEvent::Destruction { username, killer, .. } => match killer {
            Some(killer) => (ActivityKind::Destruction, format!("{username} was destroyed by {killer}")),
            None => (ActivityKind::Destruction, format!("{username} was destroyed")),
        },
        ActivityEvent::Discovery { username, what, .. } => {
            (ActivityKind::Discovery, format!("{username} discovered {what}"))
        },
        ActivityEvent::Unknown => return None,
    };
    Some(described)
}
