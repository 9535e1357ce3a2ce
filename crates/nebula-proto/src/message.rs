//! Server push messages.
//!
//! [`ServerMessage`] has one variant per event type the server emits, each
//! carrying its own payload struct. Payload structs default every field so a
//! sparse payload, or one with `null` or mistyped fields, still decodes.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    errors::{ProtocolError, Result},
    lenient::lenient,
    model::{ChatMessage, NearbyEntity, Player, PoiInfo, Ship, SystemInfo, TradeOffer},
};

/// Server metadata sent right after the socket opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomePayload {
    /// Server build version.
    #[serde(deserialize_with = "lenient")]
    pub version: String,
    /// Protocol revision.
    #[serde(deserialize_with = "lenient")]
    pub protocol_version: u32,
    /// Seconds per tick.
    #[serde(deserialize_with = "lenient")]
    pub tick_rate: f64,
    /// Tick at the time of connection.
    #[serde(deserialize_with = "lenient")]
    pub current_tick: u64,
    /// Message of the day.
    #[serde(deserialize_with = "lenient")]
    pub motd: Option<String>,
}

/// Account creation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisteredPayload {
    /// New player id.
    #[serde(deserialize_with = "lenient")]
    pub player_id: String,
    /// Generated password. Shown once.
    #[serde(deserialize_with = "lenient")]
    pub password: String,
}

/// Login result, seeding the whole view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggedInPayload {
    /// Player record.
    #[serde(deserialize_with = "lenient")]
    pub player: Player,
    /// Active ship.
    #[serde(deserialize_with = "lenient")]
    pub ship: Option<Ship>,
    /// Current system.
    #[serde(deserialize_with = "lenient")]
    pub system: Option<SystemInfo>,
    /// Current POI.
    #[serde(deserialize_with = "lenient")]
    pub poi: Option<PoiInfo>,
    /// Trade offers waiting for an answer.
    #[serde(deserialize_with = "lenient")]
    pub pending_trades: Vec<TradeOffer>,
    /// Recent chat backlog.
    #[serde(deserialize_with = "lenient")]
    pub recent_chat: Vec<ChatMessage>,
}

/// Periodic state snapshot. Absent fields mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateUpdatePayload {
    /// Current tick.
    #[serde(deserialize_with = "lenient")]
    pub tick: Option<u64>,
    /// Player record.
    #[serde(deserialize_with = "lenient")]
    pub player: Option<Player>,
    /// Ship state.
    #[serde(deserialize_with = "lenient")]
    pub ship: Option<Ship>,
    /// Entities at the current POI.
    #[serde(deserialize_with = "lenient")]
    pub nearby: Option<Vec<NearbyEntity>>,
    /// Whether the player is fighting.
    #[serde(deserialize_with = "lenient")]
    pub in_combat: Option<bool>,
    /// Travel completion percentage.
    #[serde(deserialize_with = "lenient")]
    pub travel_progress: Option<f64>,
    /// Travel destination name.
    #[serde(deserialize_with = "lenient")]
    pub travel_destination: Option<String>,
    /// Travel kind (`travel` within a system, `jump` between systems).
    #[serde(deserialize_with = "lenient")]
    pub travel_type: Option<String>,
    /// Tick at which travel completes.
    #[serde(deserialize_with = "lenient")]
    pub travel_arrival_tick: Option<u64>,
}

/// Tick counter advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickPayload {
    /// Current tick.
    #[serde(deserialize_with = "lenient")]
    pub tick: u64,
}

/// Command acknowledgement.
///
/// `action` names the command being acknowledged; the remaining fields are
/// filled depending on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OkPayload {
    /// Acknowledged command.
    #[serde(deserialize_with = "lenient")]
    pub action: Option<String>,
    /// Server-provided text.
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
    /// POI name (arrivals).
    #[serde(deserialize_with = "lenient")]
    pub poi: Option<String>,
    /// Destination system or POI.
    #[serde(deserialize_with = "lenient")]
    pub destination: Option<String>,
    /// Base name (dock).
    #[serde(deserialize_with = "lenient")]
    pub base: Option<String>,
    /// Item involved (mine, craft, buy, sell).
    #[serde(deserialize_with = "lenient")]
    pub item: Option<String>,
    /// Quantity involved.
    #[serde(deserialize_with = "lenient")]
    pub quantity: Option<u32>,
    /// Credits spent or earned.
    #[serde(deserialize_with = "lenient")]
    pub credits: Option<i64>,
    /// Attack target name.
    #[serde(deserialize_with = "lenient")]
    pub target: Option<String>,
    /// Skill raised by crafting.
    #[serde(deserialize_with = "lenient")]
    pub skill: Option<String>,
    /// New level after a level-up.
    #[serde(deserialize_with = "lenient")]
    pub new_level: Option<u32>,
    /// Trade concerned by a trade acknowledgement.
    #[serde(deserialize_with = "lenient")]
    pub trade_id: Option<String>,
    /// System detail (`get_system`).
    #[serde(deserialize_with = "lenient")]
    pub system: Option<SystemInfo>,
    /// Current POI detail (`get_system`).
    #[serde(deserialize_with = "lenient")]
    pub poi_info: Option<PoiInfo>,
}

/// Application error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorPayload {
    /// Machine-readable code.
    #[serde(deserialize_with = "lenient")]
    pub code: String,
    /// Human-readable text.
    #[serde(deserialize_with = "lenient")]
    pub message: String,
}

impl ErrorPayload {
    /// Code sent when the session is already authenticated.
    pub const ALREADY_LOGGED_IN: &'static str = "already_logged_in";

    /// Whether this error actually signals a valid, live session.
    pub fn is_already_logged_in(&self) -> bool {
        self.code == Self::ALREADY_LOGGED_IN
            || self.message.to_ascii_lowercase().contains("already logged in")
    }
}

/// Combat round result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatUpdatePayload {
    /// Attacker name.
    #[serde(deserialize_with = "lenient")]
    pub attacker: String,
    /// Target name.
    #[serde(deserialize_with = "lenient")]
    pub target: String,
    /// Damage dealt.
    #[serde(deserialize_with = "lenient")]
    pub damage: i64,
    /// Damage type.
    #[serde(deserialize_with = "lenient")]
    pub damage_type: Option<String>,
    /// Target was destroyed.
    #[serde(deserialize_with = "lenient")]
    pub destroyed: bool,
}

/// Our ship was destroyed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerDiedPayload {
    /// Killer name, if another player.
    #[serde(deserialize_with = "lenient")]
    pub killer_name: Option<String>,
    /// Cause of death.
    #[serde(deserialize_with = "lenient")]
    pub cause: Option<String>,
    /// Base where the player respawns.
    #[serde(deserialize_with = "lenient")]
    pub respawn_base: Option<String>,
}

/// Mining output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningYieldPayload {
    /// Resource mined.
    #[serde(deserialize_with = "lenient")]
    pub resource_id: String,
    /// Units mined.
    #[serde(deserialize_with = "lenient")]
    pub quantity: u32,
}

/// Result of our scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanResultPayload {
    /// Scanned entity id.
    #[serde(deserialize_with = "lenient")]
    pub target_id: String,
    /// Scanned entity name.
    #[serde(deserialize_with = "lenient")]
    pub username: Option<String>,
    /// Scan succeeded.
    #[serde(deserialize_with = "lenient")]
    pub success: bool,
    /// Revealed details.
    #[serde(deserialize_with = "lenient")]
    pub revealed: Option<Value>,
}

/// Somebody scanned us.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanDetectedPayload {
    /// Scanner name.
    #[serde(deserialize_with = "lenient")]
    pub scanner_username: Option<String>,
    /// Scanner hull class.
    #[serde(deserialize_with = "lenient")]
    pub scanner_ship_class: Option<String>,
    /// Server-provided text.
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
}

/// Somebody arrived at or left our POI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiMovementPayload {
    /// Player name.
    #[serde(deserialize_with = "lenient")]
    pub username: String,
    /// Clan tag, if any.
    #[serde(deserialize_with = "lenient")]
    pub clan_tag: Option<String>,
    /// POI name.
    #[serde(deserialize_with = "lenient")]
    pub poi_name: Option<String>,
}

/// A pilotless ship appeared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotlessShipPayload {
    /// Owner of the ship.
    #[serde(deserialize_with = "lenient")]
    pub player_username: String,
    /// Hull class.
    #[serde(deserialize_with = "lenient")]
    pub ship_class: Option<String>,
    /// POI where it drifts.
    #[serde(deserialize_with = "lenient")]
    pub poi_name: Option<String>,
}

/// A skill leveled up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillLevelUpPayload {
    /// Skill id.
    #[serde(deserialize_with = "lenient")]
    pub skill_id: String,
    /// Level reached.
    #[serde(deserialize_with = "lenient")]
    pub new_level: u32,
}

/// Informational notice shared by police, drone and base raid events.
///
/// Keeps every extra field so the log entry can carry it as structured data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticePayload {
    /// Server-provided text.
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Session resumed after a transport drop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectedPayload {
    /// Server-provided text.
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
    /// Ship drifted pilotless while we were gone.
    #[serde(deserialize_with = "lenient")]
    pub was_pilotless: bool,
}

/// Command queue flushed by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueClearedPayload {
    /// Why the queue was cleared.
    #[serde(deserialize_with = "lenient")]
    pub reason: Option<String>,
}

/// Inbound push message.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Server metadata.
    Welcome(WelcomePayload),
    /// Account created.
    Registered(RegisteredPayload),
    /// Session authenticated.
    LoggedIn(Box<LoggedInPayload>),
    /// Sparse state snapshot.
    StateUpdate(Box<StateUpdatePayload>),
    /// Tick advance.
    Tick(TickPayload),
    /// Command acknowledgement.
    Ok(Box<OkPayload>),
    /// Application error.
    Error(ErrorPayload),
    /// Combat round.
    CombatUpdate(CombatUpdatePayload),
    /// Our ship was destroyed.
    PlayerDied(PlayerDiedPayload),
    /// Mining output.
    MiningYield(MiningYieldPayload),
    /// Chat message.
    ChatMessage(ChatMessage),
    /// Incoming trade offer.
    TradeOfferReceived(TradeOffer),
    /// Result of our scan.
    ScanResult(ScanResultPayload),
    /// We were scanned.
    ScanDetected(ScanDetectedPayload),
    /// Player arrived at our POI.
    PoiArrival(PoiMovementPayload),
    /// Player left our POI.
    PoiDeparture(PoiMovementPayload),
    /// Pilotless ship nearby.
    PilotlessShip(PilotlessShipPayload),
    /// Skill leveled up.
    SkillLevelUp(SkillLevelUpPayload),
    /// Police warning.
    PoliceWarning(NoticePayload),
    /// Police spawned.
    PoliceSpawn(NoticePayload),
    /// Police engaged.
    PoliceCombat(NoticePayload),
    /// Drone status.
    DroneUpdate(NoticePayload),
    /// Drone lost.
    DroneDestroyed(NoticePayload),
    /// Base raid progress.
    BaseRaidUpdate(NoticePayload),
    /// Base destroyed.
    BaseDestroyed(NoticePayload),
    /// Session resumed.
    Reconnected(ReconnectedPayload),
    /// Command queue cleared.
    QueueCleared(QueueClearedPayload),
    /// Type this client does not understand.
    Unknown {
        /// The unrecognized `type` value.
        kind: String,
    },
}

/// Decode a payload, treating `null`/absent as an all-default payload.
fn payload<T: DeserializeOwned + Default>(kind: &str, value: Value) -> Result<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
        .map_err(|e| ProtocolError::InvalidPayload { kind: kind.to_string(), reason: e.to_string() })
}

impl ServerMessage {
    /// Build a message from its `type` tag and raw payload.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidPayload` if the payload has the wrong shape
    pub fn from_parts(kind: &str, value: Value) -> Result<Self> {
        let msg = match kind {
            "welcome" => Self::Welcome(payload(kind, value)?),
            "registered" => Self::Registered(payload(kind, value)?),
            "logged_in" => Self::LoggedIn(Box::new(payload(kind, value)?)),
            "state_update" => Self::StateUpdate(Box::new(payload(kind, value)?)),
            "tick" => Self::Tick(payload(kind, value)?),
            "ok" => Self::Ok(Box::new(payload(kind, value)?)),
            "error" => Self::Error(payload(kind, value)?),
            "combat_update" => Self::CombatUpdate(payload(kind, value)?),
            "player_died" => Self::PlayerDied(payload(kind, value)?),
            "mining_yield" => Self::MiningYield(payload(kind, value)?),
            "chat_message" => Self::ChatMessage(payload(kind, value)?),
            "trade_offer_received" => Self::TradeOfferReceived(payload(kind, value)?),
            "scan_result" => Self::ScanResult(payload(kind, value)?),
            "scan_detected" => Self::ScanDetected(payload(kind, value)?),
            "poi_arrival" => Self::PoiArrival(payload(kind, value)?),
            "poi_departure" => Self::PoiDeparture(payload(kind, value)?),
            "pilotless_ship" => Self::PilotlessShip(payload(kind, value)?),
            "skill_level_up" => Self::SkillLevelUp(payload(kind, value)?),
            "police_warning" => Self::PoliceWarning(payload(kind, value)?),
            "police_spawn" => Self::PoliceSpawn(payload(kind, value)?),
            "police_combat" => Self::PoliceCombat(payload(kind, value)?),
            "drone_update" => Self::DroneUpdate(payload(kind, value)?),
            "drone_destroyed" => Self::DroneDestroyed(payload(kind, value)?),
            "base_raid_update" => Self::BaseRaidUpdate(payload(kind, value)?),
            "base_destroyed" => Self::BaseDestroyed(payload(kind, value)?),
            "reconnected" => Self::Reconnected(payload(kind, value)?),
            "queue_cleared" => Self::QueueCleared(payload(kind, value)?),
            other => Self::Unknown { kind: other.to_string() },
        };
        Ok(msg)
    }

    /// Wire name of this message type.
    pub fn kind(&self) -> &str {
        match self {
            Self::Welcome(_) => "welcome",
            Self::Registered(_) => "registered",
            Self::LoggedIn(_) => "logged_in",
            Self::StateUpdate(_) => "state_update",
            Self::Tick(_) => "tick",
            Self::Ok(_) => "ok",
            Self::Error(_) => "error",
            Self::CombatUpdate(_) => "combat_update",
            Self::PlayerDied(_) => "player_died",
            Self::MiningYield(_) => "mining_yield",
            Self::ChatMessage(_) => "chat_message",
            Self::TradeOfferReceived(_) => "trade_offer_received",
            Self::ScanResult(_) => "scan_result",
            Self::ScanDetected(_) => "scan_detected",
            Self::PoiArrival(_) => "poi_arrival",
            Self::PoiDeparture(_) => "poi_departure",
            Self::PilotlessShip(_) => "pilotless_ship",
            Self::SkillLevelUp(_) => "skill_level_up",
            Self::PoliceWarning(_) => "police_warning",
            Self::PoliceSpawn(_) => "police_spawn",
            Self::PoliceCombat(_) => "police_combat",
            Self::DroneUpdate(_) => "drone_update",
            Self::DroneDestroyed(_) => "drone_destroyed",
            Self::BaseRaidUpdate(_) => "base_raid_update",
            Self::BaseDestroyed(_) => "base_destroyed",
            Self::Reconnected(_) => "reconnected",
            Self::QueueCleared(_) => "queue_cleared",
            Self::Unknown { kind } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_payload_defaults() {
        let msg = ServerMessage::from_parts("state_update", Value::Null).unwrap();
        let ServerMessage::StateUpdate(update) = msg else {
            panic!("expected state_update");
        };
        assert_eq!(*update, StateUpdatePayload::default());
    }

    #[test]
    fn unknown_type_is_preserved() {
        let msg = ServerMessage::from_parts("faction_war", json!({"x": 1})).unwrap();
        assert_eq!(msg, ServerMessage::Unknown { kind: "faction_war".into() });
        assert_eq!(msg.kind(), "faction_war");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = ServerMessage::from_parts("tick", json!("soon")).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPayload { ref kind, .. } if kind == "tick"));
    }

    #[test]
    fn mistyped_field_defaults_without_losing_siblings() {
        let msg = ServerMessage::from_parts(
            "state_update",
            json!({"tick": 42, "in_combat": "yes", "player": {"username": "vega", "empire": null}}),
        )
        .unwrap();
        let ServerMessage::StateUpdate(update) = msg else {
            panic!("expected state_update");
        };
        assert_eq!(update.tick, Some(42));
        assert_eq!(update.in_combat, None);
        let player = update.player.unwrap();
        assert_eq!(player.username, "vega");
        assert_eq!(player.empire, "");
    }

    #[test]
    fn error_with_null_message_still_decodes() {
        let msg = ServerMessage::from_parts(
            "error",
            json!({"code": "already_logged_in", "message": null}),
        )
        .unwrap();
        let ServerMessage::Error(error) = msg else {
            panic!("expected error");
        };
        assert!(error.is_already_logged_in());
        assert!(error.message.is_empty());
    }

    #[test]
    fn already_logged_in_detected_by_code_or_text() {
        let by_code = ErrorPayload { code: "already_logged_in".into(), message: String::new() };
        let by_text = ErrorPayload { code: "auth".into(), message: "You are Already logged in".into() };
        let other = ErrorPayload { code: "not_docked".into(), message: "Not docked".into() };

        assert!(by_code.is_already_logged_in());
        assert!(by_text.is_already_logged_in());
        assert!(!other.is_already_logged_in());
    }

    #[test]
    fn notice_keeps_extra_fields() {
        let msg =
            ServerMessage::from_parts("police_warning", json!({"message": "Leave", "level": 3}))
                .unwrap();
        let ServerMessage::PoliceWarning(notice) = msg else {
            panic!("expected police_warning");
        };
        assert_eq!(notice.message.as_deref(), Some("Leave"));
        assert_eq!(notice.details.get("level"), Some(&json!(3)));
    }
}
