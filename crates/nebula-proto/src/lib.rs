//! Nebula wire protocol
//!
//! Everything the client exchanges with the external game server: outbound
//! commands, inbound push messages, REST snapshots consumed by the map and
//! battle replay engines, and the live activity feed.
//!
//! # Framing
//!
//! The WebSocket carries JSON objects shaped `{type, payload?}`. A single
//! physical message may hold several objects separated by newlines; see
//! [`decode_frames`]. Unparseable fragments are dropped individually and never
//! abort processing of their siblings. Inside a fragment, a field holding
//! `null` or a value of the wrong type decodes to its default.
//!
//! # Components
//!
//! - [`ClientCommand`]: commands sent by the client
//! - [`ServerMessage`]: one typed variant per server push event
//! - [`map`]: galaxy map and system detail snapshots
//! - [`battle`]: paginated battle log entries
//! - [`activity`]: server-sent activity events and the SSE line decoder

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod activity;
pub mod battle;
mod command;
mod errors;
mod frame;
mod lenient;
pub mod map;
mod message;
pub mod model;

pub use command::ClientCommand;
pub use errors::{ProtocolError, Result};
pub use frame::{decode_frame, decode_frames, encode_command};
pub use message::{
    CombatUpdatePayload, ErrorPayload, LoggedInPayload, MiningYieldPayload, NoticePayload,
    OkPayload, PilotlessShipPayload, PlayerDiedPayload, PoiMovementPayload, QueueClearedPayload,
    ReconnectedPayload, RegisteredPayload, ScanDetectedPayload, ScanResultPayload, ServerMessage,
    SkillLevelUpPayload, StateUpdatePayload, TickPayload, WelcomePayload,
};
