//! Property-based tests for newline-delimited frame decoding.

use nebula_proto::{ServerMessage, TickPayload, decode_frames};
use proptest::prelude::*;

/// A fragment that is never a valid envelope.
fn garbage_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("{".to_string()),
        Just("null".to_string()),
        Just("[1,2,3]".to_string()),
        Just(r#"{"payload":{"tick":1}}"#.to_string()),
        Just(r#"{"type":"tick","payload":"x"}"#.to_string()),
        "[a-z ]{1,12}",
    ]
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in any::<String>()) {
        let _ = decode_frames(&text);
    }

    #[test]
    fn prop_valid_fragments_survive_in_order(
        ticks in prop::collection::vec(0u64..1_000_000, 1..20),
        garbage in prop::collection::vec(garbage_strategy(), 0..20),
    ) {
        let mut lines = Vec::new();
        for (i, tick) in ticks.iter().enumerate() {
            if let Some(g) = garbage.get(i) {
                lines.push(g.clone());
            }
            lines.push(format!(r#"{{"type":"tick","payload":{{"tick":{tick}}}}}"#));
        }

        let decoded = decode_frames(&lines.join("\n"));
        let expected: Vec<_> =
            ticks.iter().map(|&tick| ServerMessage::Tick(TickPayload { tick })).collect();
        prop_assert_eq!(decoded, expected);
    }
}
