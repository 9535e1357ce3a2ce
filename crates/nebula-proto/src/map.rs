//! Galaxy map snapshots.
//!
//! Systems and POIs are fetched over REST and refreshed on an interval.
//! Identity is the server-assigned id; the client never invents entities.

use serde::{Deserialize, Serialize};

use crate::lenient::lenient;

/// A star system on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSystem {
    /// System id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// World x coordinate.
    #[serde(deserialize_with = "lenient")]
    pub x: f64,
    /// World y coordinate.
    #[serde(deserialize_with = "lenient")]
    pub y: f64,
    /// Controlling empire.
    #[serde(deserialize_with = "lenient")]
    pub empire: Option<String>,
    /// Empire color as `#rrggbb`.
    #[serde(deserialize_with = "lenient")]
    pub empire_color: Option<String>,
    /// Players online in this system.
    #[serde(deserialize_with = "lenient")]
    pub online: u32,
    /// Empire home system.
    #[serde(deserialize_with = "lenient")]
    pub is_home: bool,
    /// Pirate stronghold.
    #[serde(deserialize_with = "lenient")]
    pub is_stronghold: bool,
    /// Has at least one station.
    #[serde(deserialize_with = "lenient")]
    pub has_station: bool,
    /// Adjacent system ids.
    #[serde(deserialize_with = "lenient")]
    pub connections: Vec<String>,
}

/// Full map snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyMap {
    /// All known systems.
    #[serde(deserialize_with = "lenient")]
    pub systems: Vec<MapSystem>,
}

/// Player listed at a POI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiPlayer {
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub username: String,
    /// Clan tag.
    #[serde(deserialize_with = "lenient")]
    pub clan_tag: Option<String>,
    /// Hull class.
    #[serde(deserialize_with = "lenient")]
    pub ship_class: Option<String>,
}

/// Base located at a POI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseRef {
    /// Base id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
}

/// A point of interest inside a system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapPoi {
    /// POI id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    #[serde(deserialize_with = "lenient")]
    pub kind: String,
    /// Players online here.
    #[serde(deserialize_with = "lenient")]
    pub online: u32,
    /// Players present.
    #[serde(deserialize_with = "lenient")]
    pub players: Vec<PoiPlayer>,
    /// Base located here.
    #[serde(deserialize_with = "lenient")]
    pub base: Option<BaseRef>,
}

/// On-demand detail for one system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemDetail {
    /// System id.
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// POIs in the system.
    #[serde(deserialize_with = "lenient")]
    pub pois: Vec<MapPoi>,
}
