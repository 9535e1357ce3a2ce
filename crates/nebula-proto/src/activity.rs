//! Live activity feed.
//!
//! The server streams typed activity notifications as server-sent events.
//! [`SseDecoder`] turns raw body chunks into [`SseMessage`]s; each message's
//! `data` is one JSON [`ActivityEvent`].

use serde::{Deserialize, Serialize};

use crate::lenient::lenient;

/// Activity notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A player came online.
    PlayerJoined {
        /// Player name.
        #[serde(default, deserialize_with = "lenient")]
        username: String,
        /// System where the player appeared.
        #[serde(default, deserialize_with = "lenient")]
        system_id: String,
    },
    /// Combat broke out.
    Combat {
        /// Attacker name.
        #[serde(default, deserialize_with = "lenient")]
        attacker: String,
        /// Target name.
        #[serde(default, deserialize_with = "lenient")]
        target: String,
        /// System of the fight.
        #[serde(default, deserialize_with = "lenient")]
        system_id: String,
    },
    /// In-system travel.
    Travel {
        /// Player name.
        #[serde(default, deserialize_with = "lenient")]
        username: String,
        /// System travelled within.
        #[serde(default, deserialize_with = "lenient")]
        system_id: String,
        /// Destination POI name.
        #[serde(default, deserialize_with = "lenient")]
        poi_name: Option<String>,
    },
    /// Jump between systems.
    Jump {
        /// Player name.
        #[serde(default, deserialize_with = "lenient")]
        username: String,
        /// Origin system.
        #[serde(default, deserialize_with = "lenient")]
        from_system: String,
        /// Destination system.
        #[serde(default, deserialize_with = "lenient")]
        to_system: String,
    },
    /// Ship destroyed.
    Destruction {
        /// Victim name.
        #[serde(default, deserialize_with = "lenient")]
        username: String,
        /// Killer name.
        #[serde(default, deserialize_with = "lenient")]
        killer: Option<String>,
        /// System of the destruction.
        #[serde(default, deserialize_with = "lenient")]
        system_id: String,
    },
    /// Something was discovered.
    Discovery {
        /// Discoverer name.
        #[serde(default, deserialize_with = "lenient")]
        username: String,
        /// What was found.
        #[serde(default, deserialize_with = "lenient")]
        what: String,
        /// System of the discovery.
        #[serde(default, deserialize_with = "lenient")]
        system_id: String,
    },
    /// Activity this client does not understand.
    #[serde(other)]
    Unknown,
}

impl ActivityEvent {
    /// Player the event is about.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::PlayerJoined { username, .. }
            | Self::Travel { username, .. }
            | Self::Jump { username, .. }
            | Self::Destruction { username, .. }
            | Self::Discovery { username, .. } => Some(username),
            Self::Combat { attacker, .. } => Some(attacker),
            Self::Unknown => None,
        }
    }

    /// System where the event should be drawn.
    pub fn system_id(&self) -> Option<&str> {
        match self {
            Self::PlayerJoined { system_id, .. }
            | Self::Combat { system_id, .. }
            | Self::Travel { system_id, .. }
            | Self::Destruction { system_id, .. }
            | Self::Discovery { system_id, .. } => Some(system_id),
            Self::Jump { to_system, .. } => Some(to_system),
            Self::Unknown => None,
        }
    }
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseMessage {
    /// `event:` field, if present.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
}

impl SseMessage {
    /// Decode the data as an activity event.
    pub fn activity(&self) -> Option<ActivityEvent> {
        serde_json::from_str(&self.data)
            .map_err(|e| tracing::warn!(error = %e, "dropping malformed activity event"))
            .ok()
    }
}

/// Incremental `text/event-stream` decoder.
///
/// Chunks may split lines anywhere; incomplete lines are buffered until the
/// next chunk.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line_buf: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk and return every message it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<SseMessage> {
        self.line_buf.push_str(chunk);
        let mut out = Vec::new();

        while let Some(pos) = self.line_buf.find('\n') {
            let line: String = self.line_buf.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(msg) = self.process_line(line) {
                out.push(msg);
            }
        }

        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            if self.data.is_empty() {
                self.event = None;
                return None;
            }
            return Some(SseMessage {
                event: self.event.take(),
                data: std::mem::take(&mut self.data).join("\n"),
            });
        }

        // Comment / keepalive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            _ => {},
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed("data: {\"type\":\"jump\",\"username\":\"ri").is_empty());
        let msgs =
            decoder.feed("gel\",\"from_system\":\"sol\",\"to_system\":\"vega\"}\n\n: ping\n\n");
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].activity(), Some(ActivityEvent::Jump {
            username: "rigel".into(),
            from_system: "sol".into(),
            to_system: "vega".into(),
        }));
    }

    #[test]
    fn joins_multi_line_data_and_keeps_event_name() {
        let mut decoder = SseDecoder::new();
        let msgs = decoder.feed("event: activity\r\ndata: a\r\ndata: b\r\n\r\n");
        assert_eq!(msgs, vec![SseMessage { event: Some("activity".into()), data: "a\nb".into() }]);
    }

    #[test]
    fn malformed_data_yields_no_activity() {
        let msg = SseMessage { event: None, data: "{oops".into() };
        assert_eq!(msg.activity(), None);
    }

    #[test]
    fn jump_is_drawn_at_destination() {
        let event = ActivityEvent::Jump {
            username: "rigel".into(),
            from_system: "sol".into(),
            to_system: "vega".into(),
        };
        assert_eq!(event.system_id(), Some("vega"));
        assert_eq!(event.username(), Some("rigel"));
    }
}
