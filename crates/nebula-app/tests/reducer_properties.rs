//! Property-based tests for the game state reducer.
//!
//! Arbitrary server message sequences must keep the view model bounded and
//! internally consistent.

use nebula_app::{CHAT_CAPACITY, GameAction, GameState, LOG_CAPACITY, LogKind, reduce};
use nebula_core::DisconnectReason;
use nebula_proto::{
    CombatUpdatePayload, ErrorPayload, OkPayload, PlayerDiedPayload, ServerMessage,
    StateUpdatePayload, TickPayload,
    model::{ChatChannel, ChatMessage, Player, TradeOffer},
};
use proptest::prelude::*;

fn player_strategy() -> impl Strategy<Value = Player> {
    (any::<bool>(), "[a-z]{0,6}").prop_map(|(docked, base)| Player {
        username: "rigel".into(),
        docked_at_base: docked.then_some(base),
        ..Player::default()
    })
}

fn ok_strategy() -> impl Strategy<Value = OkPayload> {
    prop_oneof![
        Just("travel"),
        Just("jump"),
        Just("dock"),
        Just("undock"),
        Just("mine"),
        Just("craft"),
        Just("attack"),
        Just("buy"),
        Just("sell"),
        Just("get_system"),
        Just("trade_accept"),
        Just("something_new"),
    ]
    .prop_map(|action| OkPayload { action: Some(action.into()), ..OkPayload::default() })
}

/// Generate random reducer actions.
fn action_strategy() -> impl Strategy<Value = GameAction> {
    prop_oneof![
        3 => (0u64..10_000).prop_map(|tick| ServerMessage::Tick(TickPayload { tick }).into()),
        4 => "[a-z ]{0,12}".prop_map(|content| {
            ServerMessage::ChatMessage(ChatMessage {
                channel: ChatChannel::Local,
                content,
                ..ChatMessage::default()
            })
            .into()
        }),
        2 => (0i64..100).prop_map(|damage| {
            ServerMessage::CombatUpdate(CombatUpdatePayload {
                attacker: "a".into(),
                target: "b".into(),
                damage,
                ..CombatUpdatePayload::default()
            })
            .into()
        }),
        1 => Just(ServerMessage::PlayerDied(PlayerDiedPayload::default()).into()),
        2 => (proptest::option::of(player_strategy()), proptest::option::of(any::<bool>()))
            .prop_map(|(player, in_combat)| {
                ServerMessage::StateUpdate(Box::new(StateUpdatePayload {
                    player,
                    in_combat,
                    ..StateUpdatePayload::default()
                }))
                .into()
            }),
        2 => ok_strategy().prop_map(|ok| ServerMessage::Ok(Box::new(ok)).into()),
        1 => "[a-z]{1,4}".prop_map(|trade_id| {
            ServerMessage::TradeOfferReceived(TradeOffer { trade_id, ..TradeOffer::default() })
                .into()
        }),
        1 => Just(
            ServerMessage::Error(ErrorPayload { code: "x".into(), message: "nope".into() }).into()
        ),
        1 => Just(GameAction::Connected),
        1 => Just(GameAction::Disconnected(DisconnectReason::Closed { code: None })),
        1 => Just(GameAction::Reset),
    ]
}

proptest! {
    #[test]
    fn prop_chat_and_log_stay_bounded(actions in prop::collection::vec(action_strategy(), 0..600)) {
        let mut state = GameState::new();
        for (i, action) in actions.into_iter().enumerate() {
            state.apply(action, i as u64);
            prop_assert!(state.chat.len() <= CHAT_CAPACITY);
            prop_assert!(state.log.len() <= LOG_CAPACITY);
        }
    }

    #[test]
    fn prop_log_is_newest_first(actions in prop::collection::vec(action_strategy(), 0..300)) {
        let mut state = GameState::new();
        for action in actions {
            state.apply(action, 0);
        }
        let ids: Vec<u64> = state.log.iter().map(|entry| entry.id).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn prop_player_died_always_clears_flags(actions in prop::collection::vec(action_strategy(), 0..100)) {
        let mut state = GameState::new();
        for action in actions {
            state.apply(action, 0);
        }
        let state = reduce(state, ServerMessage::PlayerDied(PlayerDiedPayload::default()).into(), 0);

        prop_assert!(!state.in_combat);
        prop_assert!(!state.docked);
        prop_assert_eq!(state.log[0].kind, LogKind::Combat);
    }

    #[test]
    fn prop_tick_only_update_is_sparse(
        actions in prop::collection::vec(action_strategy(), 0..100),
        tick in any::<u64>(),
    ) {
        let mut state = GameState::new();
        for action in actions {
            state.apply(action, 0);
        }

        let mut expected = state.clone();
        expected.tick = tick;

        let update = StateUpdatePayload { tick: Some(tick), ..StateUpdatePayload::default() };
        state.apply(ServerMessage::StateUpdate(Box::new(update)).into(), 0);

        prop_assert_eq!(state, expected);
    }

    #[test]
    fn prop_docked_tracks_latest_player(players in prop::collection::vec(player_strategy(), 1..20)) {
        let mut state = GameState::new();
        let last_docked = players.last().is_some_and(Player::is_docked);

        for player in players {
            let update = StateUpdatePayload { player: Some(player), ..StateUpdatePayload::default() };
            state.apply(ServerMessage::StateUpdate(Box::new(update)).into(), 0);
        }

        prop_assert_eq!(state.docked, last_docked);
        prop_assert!(state.authenticated);
    }
}
