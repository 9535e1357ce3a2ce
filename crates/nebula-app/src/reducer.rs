//! Game state reducer.
//!
//! Folds [`GameAction`]s into [`GameState`]. Every transition is synchronous
//! and total: malformed or missing optional fields fall back to generic
//! labels, and no input can make `apply` fail.

use nebula_core::DisconnectReason;
use nebula_proto::{
    ErrorPayload, LoggedInPayload, NoticePayload, OkPayload, ServerMessage, StateUpdatePayload,
};
use serde_json::{Value, json};

use crate::{
    GameAction,
    state::{GameState, LogKind},
};

/// Pure reducer form: consume a state and return the next one.
pub fn reduce(mut state: GameState, action: GameAction, timestamp: u64) -> GameState {
    state.apply(action, timestamp);
    state
}

fn or_label<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(fallback)
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    or_label(Some(value), fallback)
}

fn notice_data(notice: &NoticePayload) -> Option<Value> {
    (!notice.details.is_empty()).then(|| Value::Object(notice.details.clone()))
}

impl GameState {
    /// Apply one action. `timestamp` (unix milliseconds) stamps any log
    /// entry the action creates.
    pub fn apply(&mut self, action: GameAction, timestamp: u64) {
        match action {
            GameAction::Connected => {
                self.connected = true;
            },
            GameAction::Disconnected(reason) => self.on_disconnected(&reason, timestamp),
            GameAction::Server(msg) => self.on_server(msg, timestamp),
            GameAction::TradeResolved { trade_id } => {
                self.pending_trades.retain(|t| t.trade_id != trade_id);
            },
            GameAction::Reset => self.reset(),
        }
    }

    fn on_disconnected(&mut self, reason: &DisconnectReason, ts: u64) {
        self.connected = false;
        match reason {
            DisconnectReason::Replaced => {
                self.push_log(
                    LogKind::System,
                    "Session replaced: this account logged in elsewhere",
                    ts,
                    None,
                );
            },
            DisconnectReason::Closed { code } => {
                let data = code.map(|c| json!({ "code": c }));
                self.push_log(LogKind::System, "Connection lost, reconnecting", ts, data);
            },
            DisconnectReason::Manual => {
                self.push_log(LogKind::System, "Disconnected", ts, None);
            },
        }
    }

    fn on_server(&mut self, msg: ServerMessage, ts: u64) {
        match msg {
            ServerMessage::Welcome(info) => {
                if let Some(motd) = info.motd.as_deref().filter(|m| !m.is_empty()) {
                    self.push_log(LogKind::System, motd.to_string(), ts, None);
                }
                self.server_info = Some(info);
            },
            ServerMessage::Registered(reg) => {
                self.authenticated = true;
                self.push_log(
                    LogKind::System,
                    "Account created",
                    ts,
                    Some(json!({ "player_id": reg.player_id })),
                );
            },
            ServerMessage::LoggedIn(payload) => self.on_logged_in(*payload, ts),
            ServerMessage::StateUpdate(update) => self.on_state_update(*update),
            ServerMessage::Tick(tick) => {
                self.tick = tick.tick;
            },
            ServerMessage::Ok(ack) => self.on_ok(*ack, ts),
            ServerMessage::Error(err) => self.on_error(&err, ts),
            ServerMessage::CombatUpdate(round) => {
                let mut text = format!(
                    "{} hit {} for {} damage",
                    non_empty(&round.attacker, "Unknown"),
                    non_empty(&round.target, "unknown"),
                    round.damage
                );
                if round.destroyed {
                    text.push_str(" (destroyed)");
                }
                let data = round.damage_type.map(|t| json!({ "damage_type": t }));
                self.push_log(LogKind::Combat, text, ts, data);
            },
            ServerMessage::PlayerDied(death) => {
                self.in_combat = false;
                self.docked = false;
                if let Some(player) = self.player.as_mut() {
                    player.docked_at_base = None;
                }
                let text = match (death.killer_name.as_deref(), death.cause.as_deref()) {
                    (Some(killer), _) if !killer.is_empty() => {
                        format!("Your ship was destroyed by {killer}")
                    },
                    (_, Some(cause)) if !cause.is_empty() => {
                        format!("Your ship was destroyed: {cause}")
                    },
                    _ => "Your ship was destroyed".to_string(),
                };
                let data = death.respawn_base.map(|base| json!({ "respawn_base": base }));
                self.push_log(LogKind::Combat, text, ts, data);
            },
            ServerMessage::MiningYield(yield_) => {
                let text = format!(
                    "Mined {} {}",
                    yield_.quantity,
                    non_empty(&yield_.resource_id, "ore")
                );
                self.push_log(LogKind::Mining, text, ts, None);
            },
            ServerMessage::ChatMessage(chat) => self.push_chat(chat),
            ServerMessage::TradeOfferReceived(offer) => {
                let text =
                    format!("Trade offer from {}", non_empty(&offer.counterpart, "unknown"));
                let data = json!({ "trade_id": offer.trade_id });
                self.pending_trades.push(offer);
                self.push_log(LogKind::Trade, text, ts, Some(data));
            },
            ServerMessage::ScanResult(scan) => {
                let name = or_label(scan.username.as_deref(), &scan.target_id).to_string();
                let text = if scan.success {
                    format!("Scan of {name} complete")
                } else {
                    format!("Scan of {name} failed")
                };
                self.push_log(LogKind::Scan, text, ts, scan.revealed);
            },
            ServerMessage::ScanDetected(scan) => {
                let text = match scan.scanner_username.as_deref().filter(|s| !s.is_empty()) {
                    Some(name) => format!("You were scanned by {name}"),
                    None => or_label(scan.message.as_deref(), "You were scanned").to_string(),
                };
                let data = scan.scanner_ship_class.map(|c| json!({ "ship_class": c }));
                self.push_log(LogKind::Scan, text, ts, data);
            },
            ServerMessage::PoiArrival(movement) => {
                let text = format!("{} arrived", non_empty(&movement.username, "Someone"));
                self.push_log(LogKind::Scan, text, ts, None);
            },
            ServerMessage::PoiDeparture(movement) => {
                let text = format!("{} departed", non_empty(&movement.username, "Someone"));
                self.push_log(LogKind::Scan, text, ts, None);
            },
            ServerMessage::PilotlessShip(ship) => {
                let text = format!(
                    "Pilotless ship of {} drifting nearby",
                    non_empty(&ship.player_username, "unknown")
                );
                let data = ship.ship_class.map(|c| json!({ "ship_class": c }));
                self.push_log(LogKind::Scan, text, ts, data);
            },
            ServerMessage::SkillLevelUp(skill) => {
                let text = format!(
                    "{} reached level {}",
                    non_empty(&skill.skill_id, "Skill"),
                    skill.new_level
                );
                self.push_log(LogKind::Skill, text, ts, None);
            },
            ServerMessage::PoliceWarning(n) => self.on_notice(LogKind::Police, &n, "Police warning", ts),
            ServerMessage::PoliceSpawn(n) => {
                self.on_notice(LogKind::Police, &n, "Police have arrived", ts);
            },
            ServerMessage::PoliceCombat(n) => {
                self.on_notice(LogKind::Police, &n, "Police engaged", ts);
            },
            ServerMessage::DroneUpdate(n) => self.on_notice(LogKind::Info, &n, "Drone update", ts),
            ServerMessage::DroneDestroyed(n) => {
                self.on_notice(LogKind::Combat, &n, "Drone destroyed", ts);
            },
            ServerMessage::BaseRaidUpdate(n) => {
                self.on_notice(LogKind::Combat, &n, "Base raid in progress", ts);
            },
            ServerMessage::BaseDestroyed(n) => {
                self.on_notice(LogKind::Combat, &n, "Base destroyed", ts);
            },
            ServerMessage::Reconnected(resumed) => {
                let mut text = or_label(resumed.message.as_deref(), "Session resumed").to_string();
                if resumed.was_pilotless {
                    text.push_str(" (your ship drifted pilotless while you were away)");
                }
                self.push_log(LogKind::System, text, ts, None);
            },
            ServerMessage::QueueCleared(cleared) => {
                let text = match cleared.reason.as_deref().filter(|r| !r.is_empty()) {
                    Some(reason) => format!("Command queue cleared: {reason}"),
                    None => "Command queue cleared".to_string(),
                };
                self.push_log(LogKind::System, text, ts, None);
            },
            ServerMessage::Unknown { kind } => {
                tracing::debug!(kind, "ignoring unknown server message");
            },
        }
    }

    fn on_logged_in(&mut self, payload: LoggedInPayload, ts: u64) {
        self.authenticated = true;
        let name = non_empty(&payload.player.username, "pilot").to_string();
        self.set_player(payload.player);
        self.ship = payload.ship;
        self.system = payload.system;
        self.poi = payload.poi;
        self.pending_trades = payload.pending_trades;
        self.chat.clear();
        for msg in payload.recent_chat {
            self.push_chat(msg);
        }
        self.push_log(LogKind::System, format!("Logged in as {name}"), ts, None);
    }

    fn on_state_update(&mut self, update: StateUpdatePayload) {
        if let Some(tick) = update.tick {
            self.tick = tick;
        }
        if let Some(player) = update.player {
            if !self.authenticated {
                tracing::debug!("state update carried player data before login, marking authenticated");
                self.authenticated = true;
            }
            self.set_player(player);
        }
        if let Some(ship) = update.ship {
            self.ship = Some(ship);
        }
        if let Some(nearby) = update.nearby {
            self.nearby = nearby;
        }
        if let Some(in_combat) = update.in_combat {
            self.in_combat = in_combat;
        }
        if let Some(progress) = update.travel_progress {
            self.travel.progress = Some(progress);
        }
        if let Some(destination) = update.travel_destination {
            self.travel.destination = Some(destination);
        }
        if let Some(kind) = update.travel_type {
            self.travel.kind = Some(kind);
        }
        if let Some(arrival) = update.travel_arrival_tick {
            self.travel.arrival_tick = Some(arrival);
        }
    }

    fn on_ok(&mut self, ack: OkPayload, ts: u64) {
        let action = ack.action.as_deref().unwrap_or_default();
        match action {
            "travel" => {
                self.travel = Default::default();
                let text = format!("Arrived at {}", or_label(ack.poi.as_deref(), "destination"));
                self.push_log(LogKind::Travel, text, ts, None);
            },
            "jump" => {
                self.travel = Default::default();
                let text = format!(
                    "Jumped to {}",
                    or_label(ack.destination.as_deref().or(ack.poi.as_deref()), "new system")
                );
                self.push_log(LogKind::Travel, text, ts, None);
            },
            "dock" => {
                self.docked = true;
                let text = format!("Docked at {}", or_label(ack.base.as_deref(), "base"));
                self.push_log(LogKind::Travel, text, ts, None);
            },
            "undock" => {
                self.docked = false;
                self.push_log(LogKind::Travel, "Undocked", ts, None);
            },
            "mine" => {
                let text = format!(
                    "Mined {} {}",
                    ack.quantity.unwrap_or(0),
                    or_label(ack.item.as_deref(), "ore")
                );
                self.push_log(LogKind::Mining, text, ts, None);
            },
            "craft" => {
                let mut text = format!(
                    "Crafted {}x {}",
                    ack.quantity.unwrap_or(1),
                    or_label(ack.item.as_deref(), "item")
                );
                if let (Some(skill), Some(level)) = (ack.skill.as_deref(), ack.new_level) {
                    text.push_str(&format!(" ({skill} reached level {level})"));
                }
                self.push_log(LogKind::Skill, text, ts, None);
            },
            "attack" => {
                let text = format!("Attacking {}", or_label(ack.target.as_deref(), "target"));
                self.push_log(LogKind::Combat, text, ts, None);
            },
            "buy" | "sell" => {
                let verb = if action == "buy" { "Bought" } else { "Sold" };
                let mut text = format!(
                    "{verb} {} {}",
                    ack.quantity.unwrap_or(0),
                    or_label(ack.item.as_deref(), "items")
                );
                if let Some(credits) = ack.credits {
                    text.push_str(&format!(" for {credits} credits"));
                }
                self.push_log(LogKind::Trade, text, ts, None);
            },
            "get_system" => {
                if let Some(system) = ack.system {
                    self.system = Some(system);
                }
                if let Some(poi) = ack.poi_info {
                    self.poi = Some(poi);
                }
            },
            "trade_accept" | "trade_decline" => {
                if let Some(trade_id) = ack.trade_id.as_deref() {
                    self.pending_trades.retain(|t| t.trade_id != trade_id);
                }
                let text = if action == "trade_accept" { "Trade accepted" } else { "Trade declined" };
                self.push_log(LogKind::Trade, text, ts, None);
            },
            _ => {
                let text = or_label(ack.message.as_deref(), "OK").to_string();
                self.push_log(LogKind::Info, text, ts, None);
            },
        }
    }

    fn on_error(&mut self, err: &ErrorPayload, ts: u64) {
        if err.is_already_logged_in() {
            self.authenticated = true;
            self.push_log(LogKind::System, "Session already active, resuming", ts, None);
            return;
        }

        let text = non_empty(&err.message, "Unknown error").to_string();
        let data = (!err.code.is_empty()).then(|| json!({ "code": err.code }));
        self.push_log(LogKind::Error, text, ts, data);
    }

    fn on_notice(&mut self, kind: LogKind, notice: &NoticePayload, fallback: &str, ts: u64) {
        let text = or_label(notice.message.as_deref(), fallback).to_string();
        self.push_log(kind, text, ts, notice_data(notice));
    }
}

#[cfg(test)]
mod tests {
    use nebula_proto::{
        CombatUpdatePayload, PlayerDiedPayload, TickPayload, WelcomePayload,
        model::{ChatMessage, Player, TradeOffer},
    };

    use super::*;

    fn docked_player() -> Player {
        Player {
            id: "p1".into(),
            username: "rigel".into(),
            docked_at_base: Some("sol_station".into()),
            ..Player::default()
        }
    }

    fn logged_in(state: &mut GameState) {
        state.apply(
            GameAction::Server(ServerMessage::LoggedIn(Box::new(LoggedInPayload {
                player: docked_player(),
                pending_trades: vec![TradeOffer { trade_id: "t1".into(), ..TradeOffer::default() }],
                recent_chat: vec![ChatMessage::default(); 3],
                ..LoggedInPayload::default()
            }))),
            1,
        );
    }

    fn ok(action: &str) -> OkPayload {
        OkPayload { action: Some(action.into()), ..OkPayload::default() }
    }

    #[test]
    fn welcome_keeps_auth_untouched() {
        let mut state = GameState::new();
        state.apply(
            ServerMessage::Welcome(WelcomePayload { tick_rate: 10.0, ..WelcomePayload::default() })
                .into(),
            0,
        );

        assert!(!state.authenticated);
        assert_eq!(state.tick_rate(), Some(10.0));
        assert!(state.log.is_empty());
    }

    #[test]
    fn login_seeds_view_and_derives_docked() {
        let mut state = GameState::new();
        logged_in(&mut state);

        assert!(state.authenticated);
        assert!(state.docked);
        assert_eq!(state.pending_trades.len(), 1);
        assert_eq!(state.chat.len(), 3);
        assert_eq!(state.log[0].kind, LogKind::System);
        assert_eq!(state.log[0].message, "Logged in as rigel");
    }

    #[test]
    fn player_update_rederives_docked() {
        let mut state = GameState::new();
        logged_in(&mut state);

        let undocked = Player { docked_at_base: None, ..docked_player() };
        state.apply(
            ServerMessage::StateUpdate(Box::new(StateUpdatePayload {
                player: Some(undocked),
                ..StateUpdatePayload::default()
            }))
            .into(),
            2,
        );
        assert!(!state.docked);
    }

    #[test]
    fn state_update_with_player_infers_authentication() {
        let mut state = GameState::new();
        state.apply(
            ServerMessage::StateUpdate(Box::new(StateUpdatePayload {
                player: Some(Player::default()),
                ..StateUpdatePayload::default()
            }))
            .into(),
            0,
        );
        assert!(state.authenticated);
    }

    #[test]
    fn tick_only_update_is_sparse() {
        let mut state = GameState::new();
        logged_in(&mut state);
        state.in_combat = true;
        state.travel.progress = Some(40.0);

        let before = state.clone();
        state.apply(
            ServerMessage::StateUpdate(Box::new(StateUpdatePayload {
                tick: Some(99),
                ..StateUpdatePayload::default()
            }))
            .into(),
            5,
        );

        let mut expected = before;
        expected.tick = 99;
        assert_eq!(state, expected);
    }

    #[test]
    fn already_logged_in_error_recovers_session() {
        let mut state = GameState::new();
        state.apply(
            ServerMessage::Error(ErrorPayload {
                code: "already_logged_in".into(),
                message: "Already logged in".into(),
            })
            .into(),
            7,
        );

        assert!(state.authenticated);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log[0].kind, LogKind::System);
    }

    #[test]
    fn other_errors_are_logged_as_errors() {
        let mut state = GameState::new();
        state.apply(
            ServerMessage::Error(ErrorPayload { code: "no_fuel".into(), message: String::new() })
                .into(),
            7,
        );

        assert!(!state.authenticated);
        assert_eq!(state.log[0].kind, LogKind::Error);
        assert_eq!(state.log[0].message, "Unknown error");
        assert_eq!(state.log[0].data, Some(json!({ "code": "no_fuel" })));
    }

    #[test]
    fn player_died_clears_combat_and_docked() {
        let mut state = GameState::new();
        logged_in(&mut state);
        state.in_combat = true;

        state.apply(
            ServerMessage::PlayerDied(PlayerDiedPayload {
                killer_name: Some("vega".into()),
                ..PlayerDiedPayload::default()
            })
            .into(),
            3,
        );

        assert!(!state.in_combat);
        assert!(!state.docked);
        assert!(!state.player.as_ref().is_some_and(Player::is_docked));
        assert_eq!(state.log[0].message, "Your ship was destroyed by vega");
    }

    #[test]
    fn dock_and_undock_flip_flag() {
        let mut state = GameState::new();
        state.apply(
            ServerMessage::Ok(Box::new(OkPayload { base: Some("Sol Hub".into()), ..ok("dock") }))
                .into(),
            0,
        );
        assert!(state.docked);
        assert_eq!(state.log[0].message, "Docked at Sol Hub");

        state.apply(ServerMessage::Ok(Box::new(ok("undock"))).into(), 0);
        assert!(!state.docked);
    }

    #[test]
    fn get_system_ack_refreshes_location() {
        let mut state = GameState::new();
        let system = nebula_proto::model::SystemInfo { id: "sol".into(), ..Default::default() };
        state.apply(
            ServerMessage::Ok(Box::new(OkPayload { system: Some(system), ..ok("get_system") }))
                .into(),
            0,
        );

        assert_eq!(state.system.as_ref().map(|s| s.id.as_str()), Some("sol"));
        assert!(state.log.is_empty());
    }

    #[test]
    fn trade_leaves_pending_only_on_ack() {
        let mut state = GameState::new();
        logged_in(&mut state);

        state.apply(ServerMessage::Ok(Box::new(ok("trade_accept"))).into(), 0);
        assert_eq!(state.pending_trades.len(), 1);

        state.apply(
            ServerMessage::Ok(Box::new(OkPayload { trade_id: Some("t1".into()), ..ok("trade_accept") }))
                .into(),
            0,
        );
        assert!(state.pending_trades.is_empty());
    }

    #[test]
    fn local_trade_resolution_drops_offer() {
        let mut state = GameState::new();
        logged_in(&mut state);
        state.apply(GameAction::TradeResolved { trade_id: "t1".into() }, 0);
        assert!(state.pending_trades.is_empty());
    }

    #[test]
    fn reset_preserves_connection_and_server_info() {
        let mut state = GameState::new();
        state.apply(GameAction::Connected, 0);
        state.apply(ServerMessage::Welcome(WelcomePayload::default()).into(), 0);
        logged_in(&mut state);

        state.apply(GameAction::Reset, 0);

        assert!(state.connected);
        assert!(state.server_info.is_some());
        assert!(!state.authenticated);
        assert!(state.player.is_none());
        assert!(state.log.is_empty());
    }

    #[test]
    fn disconnect_keeps_view_intact() {
        let mut state = GameState::new();
        state.apply(GameAction::Connected, 0);
        logged_in(&mut state);

        state.apply(GameAction::Disconnected(DisconnectReason::Closed { code: Some(1006) }), 0);

        assert!(!state.connected);
        assert!(state.authenticated);
        assert!(state.player.is_some());
    }

    #[test]
    fn informational_events_do_not_touch_core_state() {
        let mut state = GameState::new();
        logged_in(&mut state);
        let before = state.clone();

        state.apply(
            ServerMessage::CombatUpdate(CombatUpdatePayload {
                attacker: "a".into(),
                target: "b".into(),
                damage: 5,
                ..CombatUpdatePayload::default()
            })
            .into(),
            0,
        );
        state.apply(ServerMessage::PoliceWarning(NoticePayload::default()).into(), 0);

        assert_eq!(state.player, before.player);
        assert_eq!(state.ship, before.ship);
        assert_eq!(state.docked, before.docked);
        assert_eq!(state.in_combat, before.in_combat);
        assert_eq!(state.log.len(), before.log.len() + 2);
    }

    #[test]
    fn unknown_messages_are_ignored() {
        let state = reduce(GameState::new(), ServerMessage::Unknown { kind: "x".into() }.into(), 0);
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn tick_message_updates_counter_only() {
        let state = reduce(GameState::new(), ServerMessage::Tick(TickPayload { tick: 4 }).into(), 0);
        assert_eq!(state.tick, 4);
        assert!(state.log.is_empty());
    }
}
