//! Fuzz target for newline-delimited frame decoding
//!
//! Feeds arbitrary text through the batch decoder and folds every decoded
//! message into a fresh game state.
//!
//! # Invariants
//!
//! - Decoding never panics; bad fragments are dropped
//! - A batch never yields more messages than it has non-blank lines
//! - Reducing any decoded message never panics

#![no_main]

use libfuzzer_sys::fuzz_target;
use nebula_app::{GameAction, GameState};
use nebula_proto::{decode_frame, decode_frames};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let messages = decode_frames(text);
    let fragments = text.split('\n').filter(|line| !line.trim().is_empty()).count();
    assert!(messages.len() <= fragments);

    for line in text.split('\n') {
        let _ = decode_frame(line);
    }

    let mut state = GameState::new();
    for (timestamp, message) in (0u64..).zip(messages) {
        state.apply(GameAction::Server(message), timestamp);
    }
});
