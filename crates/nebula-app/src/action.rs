//! Reducer inputs.
//!
//! Every change to [`crate::GameState`] is the result of exactly one
//! [`GameAction`].

use nebula_core::{ConnectionEvent, DisconnectReason};
use nebula_proto::ServerMessage;

/// Actions folded into the game state.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    /// Socket opened.
    Connected,

    /// Socket went away.
    Disconnected(DisconnectReason),

    /// A decoded server push message.
    Server(ServerMessage),

    /// A pending trade was answered outside the normal acknowledgement path.
    TradeResolved {
        /// Trade to drop from the pending list.
        trade_id: String,
    },

    /// Return to an empty view, keeping connection and server metadata.
    Reset,
}

impl From<ConnectionEvent> for GameAction {
    fn from(event: ConnectionEvent) -> Self {
        match event {
            ConnectionEvent::Connected => Self::Connected,
            ConnectionEvent::Message(msg) => Self::Server(msg),
            ConnectionEvent::Disconnected(reason) => Self::Disconnected(reason),
        }
    }
}

impl From<ServerMessage> for GameAction {
    fn from(msg: ServerMessage) -> Self {
        Self::Server(msg)
    }
}
