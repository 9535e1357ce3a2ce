//! Scripted server traffic.
//!
//! Builders for the newline-delimited JSON a real server would push, so
//! tests read as a conversation instead of string literals.

use serde_json::{Value, json};

fn frame(kind: &str, payload: Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

/// Join frames into one physical message.
pub fn batch<I, S>(frames: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    frames.into_iter().map(|f| f.as_ref().to_owned()).collect::<Vec<_>>().join("\n")
}

/// `welcome` with the given tick rate and current tick.
pub fn welcome(tick_rate: f64, current_tick: u64) -> String {
    frame(
        "welcome",
        json!({
            "version": "sim",
            "protocol_version": 1,
            "tick_rate": tick_rate,
            "current_tick": current_tick,
        }),
    )
}

/// `tick` advance.
pub fn tick(tick: u64) -> String {
    frame("tick", json!({ "tick": tick }))
}

/// `registered` with generated credentials.
pub fn registered(player_id: &str, password: &str) -> String {
    frame("registered", json!({ "player_id": player_id, "password": password }))
}

/// Application `error`.
pub fn error(code: &str, message: &str) -> String {
    frame("error", json!({ "code": code, "message": message }))
}

/// System `chat_message`.
pub fn chat(id: &str, sender: &str, content: &str) -> String {
    frame(
        "chat_message",
        json!({ "id": id, "channel": "system", "sender": sender, "content": content }),
    )
}

/// `trade_offer_received` from another player.
pub fn trade_offer(trade_id: &str, from: &str) -> String {
    frame(
        "trade_offer_received",
        json!({ "trade_id": trade_id, "from_name": from, "offer_credits": 100 }),
    )
}

#[cfg(test)]
mod tests {
    use nebula_proto::{ServerMessage, decode_frames};

    use super::*;

    #[test]
    fn batch_decodes_in_order() {
        let text = batch([welcome(10.0, 4), tick(5), tick(6)]);
        let kinds: Vec<_> =
            decode_frames(&text).iter().map(|m| m.kind().to_string()).collect();
        assert_eq!(kinds, ["welcome", "tick", "tick"]);
    }

    #[test]
    fn registered_carries_password() {
        let messages = decode_frames(&registered("p1", "s3cret"));
        let [ServerMessage::Registered(payload)] = messages.as_slice() else {
            panic!("expected one registered message, got {messages:?}");
        };
        assert_eq!(payload.password, "s3cret");
    }
}
