//! Game view model.
//!
//! [`GameState`] is the single snapshot every view renders from. It is only
//! ever changed by [`GameState::apply`](crate::GameState::apply), one
//! [`GameAction`](crate::GameAction) at a time.

use std::collections::VecDeque;

use nebula_proto::{
    WelcomePayload,
    model::{ChatChannel, ChatMessage, NearbyEntity, Player, PoiInfo, Ship, SystemInfo, TradeOffer},
};
use serde_json::Value;

/// Maximum chat messages kept. Oldest are evicted first.
pub const CHAT_CAPACITY: usize = 200;

/// Maximum log entries kept. Oldest are evicted first.
pub const LOG_CAPACITY: usize = 100;

/// Category of a log entry, used for coloring and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    /// Session and connection notices.
    System,
    /// Generic informational notice.
    Info,
    /// Travel, jumps, docking.
    Travel,
    /// Combat and destruction.
    Combat,
    /// Mining output.
    Mining,
    /// Market and player trades.
    Trade,
    /// Crafting and skill progress.
    Skill,
    /// Scans, arrivals, departures and other sightings.
    Scan,
    /// Police activity.
    Police,
    /// Server-reported failures.
    Error,
}

impl LogKind {
    /// Short label used by text views.
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Info => "info",
            Self::Travel => "travel",
            Self::Combat => "combat",
            Self::Mining => "mining",
            Self::Trade => "trade",
            Self::Skill => "skill",
            Self::Scan => "scan",
            Self::Police => "police",
            Self::Error => "error",
        }
    }
}

/// Immutable event log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Monotonic id, unique for the lifetime of the state.
    pub id: u64,
    /// Category.
    pub kind: LogKind,
    /// Human-readable text.
    pub message: String,
    /// Creation time, unix milliseconds.
    pub timestamp: u64,
    /// Structured detail carried from the server message.
    pub data: Option<Value>,
}

/// Travel in progress. Each field is merged independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelState {
    /// Completion percentage.
    pub progress: Option<f64>,
    /// Destination name.
    pub destination: Option<String>,
    /// `travel` or `jump`.
    pub kind: Option<String>,
    /// Tick at which travel completes.
    pub arrival_tick: Option<u64>,
}

impl TravelState {
    /// Whether any travel is underway.
    pub fn is_active(&self) -> bool {
        self.progress.is_some() || self.destination.is_some()
    }
}

/// The client's consistent view of the game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    /// Socket is open.
    pub connected: bool,
    /// Session is authenticated.
    pub authenticated: bool,
    /// Server metadata from `welcome`.
    pub server_info: Option<WelcomePayload>,
    /// Player record.
    pub player: Option<Player>,
    /// Active ship.
    pub ship: Option<Ship>,
    /// Current system.
    pub system: Option<SystemInfo>,
    /// Current POI.
    pub poi: Option<PoiInfo>,
    /// Entities at the current POI.
    pub nearby: Vec<NearbyEntity>,
    /// Player is fighting.
    pub in_combat: bool,
    /// Player is inside a base.
    pub docked: bool,
    /// Travel in progress.
    pub travel: TravelState,
    /// Latest server tick.
    pub tick: u64,
    /// Chat history, oldest first.
    pub chat: VecDeque<ChatMessage>,
    /// Event log, newest first.
    pub log: VecDeque<LogEntry>,
    /// Incoming trade offers awaiting an answer.
    pub pending_trades: Vec<TradeOffer>,
    next_log_id: u64,
}

impl GameState {
    /// Create an empty, disconnected state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chat messages on one channel, oldest first.
    pub fn chat_for<'a>(&'a self, channel: &'a ChatChannel) -> impl Iterator<Item = &'a ChatMessage> {
        self.chat.iter().filter(move |msg| &msg.channel == channel)
    }

    /// Seconds per tick, if the server announced it.
    pub fn tick_rate(&self) -> Option<f64> {
        self.server_info.as_ref().map(|info| info.tick_rate).filter(|rate| *rate > 0.0)
    }

    /// Ticks remaining until travel completes.
    pub fn ticks_to_arrival(&self) -> Option<u64> {
        self.travel.arrival_tick.map(|arrival| arrival.saturating_sub(self.tick))
    }

    pub(crate) fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push_back(message);
        while self.chat.len() > CHAT_CAPACITY {
            self.chat.pop_front();
        }
    }

    pub(crate) fn push_log(
        &mut self,
        kind: LogKind,
        message: impl Into<String>,
        timestamp: u64,
        data: Option<Value>,
    ) {
        self.next_log_id += 1;
        self.log.push_front(LogEntry {
            id: self.next_log_id,
            kind,
            message: message.into(),
            timestamp,
            data,
        });
        self.log.truncate(LOG_CAPACITY);
    }

    /// Sets the player record and re-derives the docked flag from it.
    pub(crate) fn set_player(&mut self, player: Player) {
        self.docked = player.is_docked();
        self.player = Some(player);
    }

    /// Empty state that keeps the connection flag and server metadata.
    pub(crate) fn reset(&mut self) {
        let connected = self.connected;
        let server_info = self.server_info.take();
        let next_log_id = self.next_log_id;
        *self = Self { connected, server_info, next_log_id, ..Self::default() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_newest_first_and_capped() {
        let mut state = GameState::new();
        for i in 0..(LOG_CAPACITY as u64 + 10) {
            state.push_log(LogKind::Info, format!("entry {i}"), i, None);
        }

        assert_eq!(state.log.len(), LOG_CAPACITY);
        assert_eq!(state.log[0].message, "entry 109");
        assert_eq!(state.log[LOG_CAPACITY - 1].message, "entry 10");
    }

    #[test]
    fn chat_evicts_oldest() {
        let mut state = GameState::new();
        for i in 0..(CHAT_CAPACITY + 3) {
            state.push_chat(ChatMessage { id: i.to_string(), ..ChatMessage::default() });
        }

        assert_eq!(state.chat.len(), CHAT_CAPACITY);
        assert_eq!(state.chat.front().map(|m| m.id.as_str()), Some("3"));
    }

    #[test]
    fn chat_projection_filters_by_channel() {
        let mut state = GameState::new();
        state.push_chat(ChatMessage { channel: ChatChannel::Local, ..ChatMessage::default() });
        state.push_chat(ChatMessage { channel: ChatChannel::Faction, ..ChatMessage::default() });
        state.push_chat(ChatMessage { channel: ChatChannel::Local, ..ChatMessage::default() });

        assert_eq!(state.chat_for(&ChatChannel::Local).count(), 2);
        assert_eq!(state.chat_for(&ChatChannel::Private).count(), 0);
    }

    #[test]
    fn log_ids_stay_unique_across_reset() {
        let mut state = GameState::new();
        state.push_log(LogKind::Info, "before", 0, None);
        state.reset();
        state.push_log(LogKind::Info, "after", 0, None);

        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log[0].id, 2);
    }

    #[test]
    fn arrival_countdown_saturates() {
        let mut state = GameState::new();
        state.tick = 10;
        state.travel.arrival_tick = Some(14);
        assert_eq!(state.ticks_to_arrival(), Some(4));

        state.tick = 20;
        assert_eq!(state.ticks_to_arrival(), Some(0));
    }
}
