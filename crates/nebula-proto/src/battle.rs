//! Battle log entries.
//!
//! A battle is an ordered sequence of per-tick [`BattleEntry`] values fetched
//! in pages. Entries are immutable once fetched.

use serde::{Deserialize, Serialize};

use crate::lenient::lenient;

/// World position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point {
    /// X coordinate.
    #[serde(deserialize_with = "lenient")]
    pub x: f64,
    /// Y coordinate.
    #[serde(deserialize_with = "lenient")]
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Participant state at one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantSnapshot {
    /// Player id.
    #[serde(deserialize_with = "lenient")]
    pub player_id: String,
    /// Display name, when the server includes it.
    #[serde(deserialize_with = "lenient")]
    pub username: Option<String>,
    /// World x coordinate.
    #[serde(deserialize_with = "lenient")]
    pub x: f64,
    /// World y coordinate.
    #[serde(deserialize_with = "lenient")]
    pub y: f64,
    /// Hull points.
    #[serde(deserialize_with = "lenient")]
    pub hull: i64,
    /// Maximum hull points.
    #[serde(deserialize_with = "lenient")]
    pub max_hull: i64,
    /// Shield points.
    #[serde(deserialize_with = "lenient")]
    pub shield: i64,
    /// Maximum shield points.
    #[serde(deserialize_with = "lenient")]
    pub max_shield: i64,
    /// Fuel units.
    #[serde(deserialize_with = "lenient")]
    pub fuel: i64,
    /// Status (`active`, `fled`, `destroyed`, ...).
    #[serde(deserialize_with = "lenient")]
    pub status: String,
    /// Side or team.
    #[serde(deserialize_with = "lenient")]
    pub side: Option<String>,
    /// Combat zone.
    #[serde(deserialize_with = "lenient")]
    pub zone: Option<String>,
    /// Combat stance.
    #[serde(deserialize_with = "lenient")]
    pub stance: Option<String>,
}

impl ParticipantSnapshot {
    /// World position.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Participant has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.status == "destroyed"
    }
}

/// Sub-event recorded during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A participant joined.
    Join {
        /// Participant id.
        #[serde(default, deserialize_with = "lenient")]
        player_id: String,
        /// Side joined.
        #[serde(default, deserialize_with = "lenient")]
        side: Option<String>,
    },
    /// Stance changed.
    StanceChange {
        /// Participant id.
        #[serde(default, deserialize_with = "lenient")]
        player_id: String,
        /// New stance.
        #[serde(default, deserialize_with = "lenient")]
        stance: String,
    },
    /// Zone changed.
    ZoneMove {
        /// Participant id.
        #[serde(default, deserialize_with = "lenient")]
        player_id: String,
        /// Previous zone.
        #[serde(default, deserialize_with = "lenient")]
        from_zone: Option<String>,
        /// New zone.
        #[serde(default, deserialize_with = "lenient")]
        to_zone: String,
    },
    /// Weapon fire.
    Attack {
        /// Attacker id.
        #[serde(default, deserialize_with = "lenient")]
        attacker_id: String,
        /// Target id.
        #[serde(default, deserialize_with = "lenient")]
        target_id: String,
        /// Damage dealt.
        #[serde(default, deserialize_with = "lenient")]
        damage: i64,
        /// Shot connected.
        #[serde(default, deserialize_with = "lenient")]
        hit: bool,
        /// Weapon used.
        #[serde(default, deserialize_with = "lenient")]
        weapon: Option<String>,
    },
    /// Shield or hull regeneration.
    Regen {
        /// Participant id.
        #[serde(default, deserialize_with = "lenient")]
        player_id: String,
        /// Shield regenerated.
        #[serde(default, deserialize_with = "lenient")]
        shield: i64,
    },
    /// Flee attempt.
    Flee {
        /// Participant id.
        #[serde(default, deserialize_with = "lenient")]
        player_id: String,
        /// Attempt succeeded.
        #[serde(default, deserialize_with = "lenient")]
        success: bool,
    },
    /// Participant destroyed.
    Kill {
        /// Killer id.
        #[serde(default, deserialize_with = "lenient")]
        killer_id: String,
        /// Victim id.
        #[serde(default, deserialize_with = "lenient")]
        victim_id: String,
    },
    /// Battle finished.
    BattleEnd {
        /// Winning side.
        #[serde(default, deserialize_with = "lenient")]
        winner: Option<String>,
        /// Summary text.
        #[serde(default, deserialize_with = "lenient")]
        summary: Option<String>,
    },
    /// Event type this client does not understand.
    #[serde(other)]
    Unknown,
}

/// All state recorded for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleEntry {
    /// Tick number.
    #[serde(deserialize_with = "lenient")]
    pub tick: u64,
    /// Participant snapshots.
    #[serde(deserialize_with = "lenient")]
    pub participants: Vec<ParticipantSnapshot>,
    /// Sub-events during this tick.
    #[serde(deserialize_with = "lenient")]
    pub events: Vec<BattleEvent>,
}

/// One page of the battle log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlePage {
    /// Entries, ordered by tick.
    #[serde(deserialize_with = "lenient")]
    pub entries: Vec<BattleEntry>,
    /// More entries exist after the last one.
    #[serde(deserialize_with = "lenient")]
    pub has_more: bool,
}

/// Battle metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleInfo {
    /// Battle id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// System the battle took place in.
    #[serde(deserialize_with = "lenient")]
    pub system_id: String,
    /// POI anchoring the battle.
    #[serde(deserialize_with = "lenient")]
    pub poi_id: Option<String>,
    /// World position of the anchoring POI.
    #[serde(deserialize_with = "lenient")]
    pub origin: Option<Point>,
}
