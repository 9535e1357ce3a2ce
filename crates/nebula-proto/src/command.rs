//! Outbound commands.

use serde::{Deserialize, Serialize};

use crate::model::{ChatChannel, ItemStack};

/// Command sent to the server as `{type, payload?}`.
///
/// Unit variants serialize without a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Create an account. The server answers with `registered`.
    Register {
        /// Desired name.
        username: String,
        /// Empire to join.
        empire: String,
    },
    /// Authenticate.
    Login {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// End the session.
    Logout,
    /// Move to another POI in the current system.
    Travel {
        /// Target POI id.
        target_poi: String,
    },
    /// Jump to an adjacent system.
    Jump {
        /// Target system id.
        target_system: String,
    },
    /// Dock at the base at the current POI.
    Dock,
    /// Leave the base.
    Undock,
    /// Mine at the current POI.
    Mine,
    /// Craft an item.
    Craft {
        /// Recipe id.
        recipe_id: String,
    },
    /// Attack another entity.
    Attack {
        /// Target entity id.
        target_id: String,
    },
    /// Buy from the base market.
    Buy {
        /// Item id.
        item_id: String,
        /// Units to buy.
        quantity: u32,
    },
    /// Sell to the base market.
    Sell {
        /// Item id.
        item_id: String,
        /// Units to sell.
        quantity: u32,
    },
    /// Send a chat message.
    Chat {
        /// Channel.
        channel: ChatChannel,
        /// Body.
        content: String,
        /// Recipient for private messages.
        #[serde(skip_serializing_if = "Option::is_none")]
        target_id: Option<String>,
    },
    /// Request current system detail.
    GetSystem,
    /// Request a full status snapshot.
    GetStatus,
    /// Scan another entity.
    Scan {
        /// Target entity id.
        target_id: String,
    },
    /// Offer a trade.
    TradeOffer {
        /// Counterpart id.
        target_id: String,
        /// Items offered.
        offer_items: Vec<ItemStack>,
        /// Credits offered.
        offer_credits: i64,
        /// Items requested.
        request_items: Vec<ItemStack>,
        /// Credits requested.
        request_credits: i64,
    },
    /// Accept a pending offer.
    TradeAccept {
        /// Trade id.
        trade_id: String,
    },
    /// Decline a pending offer.
    TradeDecline {
        /// Trade id.
        trade_id: String,
    },
}

impl ClientCommand {
    /// Wire name of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Travel { .. } => "travel",
            Self::Jump { .. } => "jump",
            Self::Dock => "dock",
            Self::Undock => "undock",
            Self::Mine => "mine",
            Self::Craft { .. } => "craft",
            Self::Attack { .. } => "attack",
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Chat { .. } => "chat",
            Self::GetSystem => "get_system",
            Self::GetStatus => "get_status",
            Self::Scan { .. } => "scan",
            Self::TradeOffer { .. } => "trade_offer",
            Self::TradeAccept { .. } => "trade_accept",
            Self::TradeDecline { .. } => "trade_decline",
        }
    }
}
