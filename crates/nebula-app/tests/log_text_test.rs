//! Snapshot tests for event log wording.
//!
//! Drives the reducer with a realistic session transcript decoded from wire
//! JSON and snapshots the rendered log, newest first.

use nebula_app::{GameAction, GameState};
use nebula_core::DisconnectReason;
use nebula_proto::decode_frames;

const TRANSCRIPT: &str = r#"
{"type":"welcome","payload":{"version":"0.9.1","tick_rate":10,"motd":"Welcome to Nebula"}}
{"type":"logged_in","payload":{"player":{"id":"p1","username":"rigel","current_system":"sol"}}}
{"type":"ok","payload":{"action":"travel","poi":"Asteroid Belt"}}
{"type":"ok","payload":{"action":"mine","item":"iron_ore","quantity":12}}
{"type":"ok","payload":{"action":"craft","item":"hull_plate","quantity":2,"skill":"crafting","new_level":3}}
{"type":"ok","payload":{"action":"sell","item":"iron_ore","quantity":5,"credits":150}}
{"type":"scan_detected","payload":{"scanner_username":"vega"}}
{"type":"police_warning"}
{"type":"combat_update","payload":{"attacker":"vega","target":"rigel","damage":14}}
{"type":"player_died","payload":{"killer_name":"vega"}}
{"type":"error","payload":{"code":"already_logged_in","message":"Already logged in"}}
"#;

fn render(state: &GameState) -> String {
    state
        .log
        .iter()
        .map(|entry| format!("[{}] {}", entry.kind.label(), entry.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn session_transcript_log() {
    let mut state = GameState::new();
    for (i, msg) in decode_frames(TRANSCRIPT).into_iter().enumerate() {
        state.apply(GameAction::Server(msg), i as u64);
    }
    state.apply(GameAction::Disconnected(DisconnectReason::Replaced), 99);

    insta::assert_snapshot!(render(&state), @r"
    [system] Session replaced: this account logged in elsewhere
    [system] Session already active, resuming
    [combat] Your ship was destroyed by vega
    [combat] vega hit rigel for 14 damage
    [police] Police warning
    [scan] You were scanned by vega
    [trade] Sold 5 iron_ore for 150 credits
    [skill] Crafted 2x hull_plate (crafting reached level 3)
    [mining] Mined 12 iron_ore
    [travel] Arrived at Asteroid Belt
    [system] Logged in as rigel
    [system] Welcome to Nebula
    ");
}

#[test]
fn missing_fields_fall_back_to_labels() {
    let mut state = GameState::new();
    let frames = r#"{"type":"ok","payload":{"action":"dock"}}
{"type":"ok","payload":{"action":"attack"}}
{"type":"ok"}
{"type":"combat_update","payload":{"damage":3,"destroyed":true}}
{"type":"queue_cleared","payload":{"reason":"docked"}}"#;
    for msg in decode_frames(frames) {
        state.apply(GameAction::Server(msg), 0);
    }

    insta::assert_snapshot!(render(&state), @r"
    [system] Command queue cleared: docked
    [combat] Unknown hit unknown for 3 damage (destroyed)
    [info] OK
    [combat] Attacking target
    [travel] Docked at base
    ");
}
