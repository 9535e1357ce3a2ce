//! Game entities shared between push messages.
//!
//! Every field defaults when absent, `null` or mistyped: the server omits
//! fields freely and one bad value must never make a whole frame unreadable.

use serde::{Deserialize, Serialize};

use crate::lenient::lenient;

/// Player record as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    /// Server-assigned player id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub username: String,
    /// Empire affiliation.
    #[serde(deserialize_with = "lenient")]
    pub empire: String,
    /// Credit balance.
    #[serde(deserialize_with = "lenient")]
    pub credits: i64,
    /// System the player is currently in.
    #[serde(deserialize_with = "lenient")]
    pub current_system: String,
    /// Point of interest the player is currently at.
    #[serde(deserialize_with = "lenient")]
    pub current_poi: String,
    /// Base the player is docked at. `None` when undocked.
    #[serde(deserialize_with = "lenient")]
    pub docked_at_base: Option<String>,
    /// Home base used for respawn.
    #[serde(deserialize_with = "lenient")]
    pub home_base: Option<String>,
}

impl Player {
    /// Whether this record places the player inside a base.
    pub fn is_docked(&self) -> bool {
        self.docked_at_base.as_deref().is_some_and(|base| !base.is_empty())
    }
}

/// A stack of items in cargo or a trade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStack {
    /// Item identifier.
    #[serde(deserialize_with = "lenient")]
    pub item_id: String,
    /// Quantity held.
    #[serde(deserialize_with = "lenient")]
    pub quantity: u32,
}

/// Current ship state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ship {
    /// Ship instance id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Hull class identifier.
    #[serde(deserialize_with = "lenient")]
    pub class_id: String,
    /// Player-chosen name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
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
    /// Maximum fuel units.
    #[serde(deserialize_with = "lenient")]
    pub max_fuel: i64,
    /// Cargo space in use.
    #[serde(deserialize_with = "lenient")]
    pub cargo_used: u32,
    /// Total cargo space.
    #[serde(deserialize_with = "lenient")]
    pub cargo_capacity: u32,
    /// Cargo contents.
    #[serde(deserialize_with = "lenient")]
    pub cargo: Vec<ItemStack>,
    /// Installed module ids.
    #[serde(deserialize_with = "lenient")]
    pub modules: Vec<String>,
}

/// Star system summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    /// System id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// Controlling empire, if any.
    #[serde(deserialize_with = "lenient")]
    pub empire: Option<String>,
    /// Police presence level.
    #[serde(deserialize_with = "lenient")]
    pub police_level: u32,
    /// Adjacent system ids.
    #[serde(deserialize_with = "lenient")]
    pub connections: Vec<String>,
}

/// Point of interest summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiInfo {
    /// POI id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// POI category (asteroid belt, station, ...).
    #[serde(rename = "type")]
    #[serde(deserialize_with = "lenient")]
    pub kind: String,
    /// Base located at this POI.
    #[serde(deserialize_with = "lenient")]
    pub base_id: Option<String>,
}

/// Another entity visible at the current POI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyEntity {
    /// Entity id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name (empty when anonymous).
    #[serde(deserialize_with = "lenient")]
    pub username: String,
    /// Hull class.
    #[serde(deserialize_with = "lenient")]
    pub ship_class: String,
    /// Clan tag, if any.
    #[serde(deserialize_with = "lenient")]
    pub clan_tag: Option<String>,
    /// Entity hides its identity.
    #[serde(deserialize_with = "lenient")]
    pub anonymous: bool,
    /// Entity is fighting.
    #[serde(deserialize_with = "lenient")]
    pub in_combat: bool,
}

/// An incoming trade offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeOffer {
    /// Trade id used to accept or decline.
    #[serde(deserialize_with = "lenient")]
    pub trade_id: String,
    /// Name of the player offering.
    #[serde(alias = "from_name")]
    #[serde(deserialize_with = "lenient")]
    pub counterpart: String,
    /// Items offered to us.
    #[serde(deserialize_with = "lenient")]
    pub offer_items: Vec<ItemStack>,
    /// Credits offered to us.
    #[serde(deserialize_with = "lenient")]
    pub offer_credits: i64,
    /// Items requested from us.
    #[serde(deserialize_with = "lenient")]
    pub request_items: Vec<ItemStack>,
    /// Credits requested from us.
    #[serde(deserialize_with = "lenient")]
    pub request_credits: i64,
}

/// Chat channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChatChannel {
    /// Everyone at the same POI.
    #[default]
    Local,
    /// Everyone in the same system.
    System,
    /// Faction members.
    Faction,
    /// Direct message.
    Private,
    /// Channel this client does not know.
    Other(String),
}

impl ChatChannel {
    /// Wire name of the channel.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::System => "system",
            Self::Faction => "faction",
            Self::Private => "private",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ChatChannel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "local" => Self::Local,
            "system" => Self::System,
            "faction" => Self::Faction,
            "private" => Self::Private,
            _ => Self::Other(value),
        }
    }
}

impl From<ChatChannel> for String {
    fn from(value: ChatChannel) -> Self {
        value.as_str().to_string()
    }
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    /// Message id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Channel the message was sent on.
    #[serde(deserialize_with = "lenient")]
    pub channel: ChatChannel,
    /// Sender name.
    #[serde(alias = "sender_name")]
    #[serde(deserialize_with = "lenient")]
    pub sender: String,
    /// Recipient for private messages.
    #[serde(deserialize_with = "lenient")]
    pub target: Option<String>,
    /// Message body.
    #[serde(deserialize_with = "lenient")]
    pub content: String,
    /// Server timestamp (RFC 3339).
    #[serde(deserialize_with = "lenient")]
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docked_requires_non_empty_base() {
        let mut player = Player::default();
        assert!(!player.is_docked());

        player.docked_at_base = Some(String::new());
        assert!(!player.is_docked());

        player.docked_at_base = Some("base_sol".into());
        assert!(player.is_docked());
    }

    #[test]
    fn unknown_chat_channel_is_preserved() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"channel":"clan","sender":"a","content":"hi"}"#).unwrap();
        assert_eq!(msg.channel, ChatChannel::Other("clan".into()));
        assert_eq!(msg.channel.as_str(), "clan");
    }

    #[test]
    fn trade_offer_accepts_from_name_alias() {
        let offer: TradeOffer =
            serde_json::from_str(r#"{"trade_id":"t1","from_name":"vega","offer_credits":50}"#)
                .unwrap();
        assert_eq!(offer.counterpart, "vega");
        assert_eq!(offer.offer_credits, 50);
        assert!(offer.request_items.is_empty());
    }
}
