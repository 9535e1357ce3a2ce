//! Newline-delimited JSON framing.
//!
//! One physical WebSocket message may carry several JSON objects separated by
//! `\n`. Each fragment is decoded on its own so a broken fragment costs only
//! itself.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    ClientCommand, ServerMessage,
    errors::{ProtocolError, Result},
};

/// Untyped envelope `{type, payload?}`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Decode a single JSON fragment.
///
/// # Errors
///
/// - `ProtocolError::MalformedFrame` if the fragment is not an envelope
/// - `ProtocolError::InvalidPayload` if the payload has the wrong shape
pub fn decode_frame(fragment: &str) -> Result<ServerMessage> {
    let envelope: Envelope = serde_json::from_str(fragment)?;
    ServerMessage::from_parts(&envelope.kind, envelope.payload)
}

/// Split a physical message into fragments and decode each one, in order.
///
/// Blank lines are skipped. Fragments that fail to decode are logged and
/// dropped without affecting the rest.
pub fn decode_frames(text: &str) -> Vec<ServerMessage> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match decode_frame(line) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable frame fragment");
                None
            },
        })
        .collect()
}

/// Serialize a command for the socket.
///
/// # Errors
///
/// - `ProtocolError::Encode` if serialization fails
pub fn encode_command(command: &ClientCommand) -> Result<String> {
    serde_json::to_string(command).map_err(|e| ProtocolError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TickPayload;

    #[test]
    fn splits_multiple_fragments_in_order() {
        let text = "{\"type\":\"tick\",\"payload\":{\"tick\":5}}\n{\"type\":\"tick\",\"payload\":{\"tick\":6}}";
        let msgs = decode_frames(text);
        assert_eq!(msgs, vec![
            ServerMessage::Tick(TickPayload { tick: 5 }),
            ServerMessage::Tick(TickPayload { tick: 6 }),
        ]);
    }

    #[test]
    fn broken_fragment_does_not_poison_siblings() {
        let text = "{\"type\":\"tick\",\"payload\":{\"tick\":1}}\n{not json\n\n{\"type\":\"tick\",\"payload\":{\"tick\":2}}\r\n";
        let msgs = decode_frames(text);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1], ServerMessage::Tick(TickPayload { tick: 2 }));
    }

    #[test]
    fn missing_payload_decodes_to_defaults() {
        let msg = decode_frame(r#"{"type":"welcome"}"#).unwrap();
        assert!(matches!(msg, ServerMessage::Welcome(w) if w.version.is_empty()));
    }

    #[test]
    fn missing_type_is_malformed() {
        let err = decode_frame(r#"{"payload":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedFrame(_)));
    }

    #[test]
    fn encode_login() {
        let text = encode_command(&ClientCommand::Login {
            username: "nova".into(),
            password: "pw".into(),
        })
        .unwrap();
        assert_eq!(text, r#"{"type":"login","payload":{"username":"nova","password":"pw"}}"#);
    }
}
