//! Property tests for coordinate transforms.
//!
//! - Galaxy camera: `screen_to_world(world_to_screen(p)) == p` at any zoom and
//!   offset, and the point under the cursor stays put across a zoom.
//! - Battle viewport: bounds and scale never change while the cursor moves.

use std::time::Duration;

use nebula_proto::battle::{BattleEntry, ParticipantSnapshot};
use nebula_render::{BattleReplay, Point, galaxy::camera::Camera};
use proptest::prelude::*;

fn close(a: Point, b: Point) -> bool {
    let tolerance = 1e-6 * (1.0 + a.x.abs().max(a.y.abs()));
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
}

fn coordinate() -> impl Strategy<Value = f64> {
    -5_000.0..5_000.0f64
}

fn battle_strategy() -> impl Strategy<Value = Vec<BattleEntry>> {
    prop::collection::vec(
        prop::collection::vec((coordinate(), coordinate()), 1..6),
        1..40,
    )
    .prop_map(|ticks| {
        ticks
            .into_iter()
            .enumerate()
            .map(|(tick, positions)| BattleEntry {
                tick: tick as u64,
                participants: positions
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| ParticipantSnapshot {
                        player_id: format!("p{i}"),
                        x,
                        y,
                        ..ParticipantSnapshot::default()
                    })
                    .collect(),
                events: vec![],
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_camera_round_trip(
        ox in coordinate(),
        oy in coordinate(),
        zoom in 0.05..8.0f64,
        x in coordinate(),
        y in coordinate(),
    ) {
        let mut camera = Camera::new(1024.0, 768.0);
        camera.jump_to(Point::new(ox, oy), zoom);

        let world = Point::new(x, y);
        let back = camera.screen_to_world(camera.world_to_screen(world));
        prop_assert!(close(world, back), "{world:?} -> {back:?}");
    }

    #[test]
    fn prop_zoom_keeps_cursor_anchor(
        cx in 0.0..1024.0f64,
        cy in 0.0..768.0f64,
        factor in 0.5..2.0f64,
    ) {
        let mut camera = Camera::new(1024.0, 768.0);
        let cursor = Point::new(cx, cy);
        let anchor = camera.screen_to_world(cursor);

        camera.zoom_at(cursor, factor);
        camera.step(Duration::from_secs(10));

        prop_assert!(close(camera.screen_to_world(cursor), anchor));
    }

    #[test]
    fn prop_battle_viewport_is_stable(
        entries in battle_strategy(),
        seeks in prop::collection::vec(0usize..64, 1..20),
    ) {
        let mut replay = BattleReplay::new(entries, None, 800.0, 600.0).unwrap();
        let initial = *replay.viewport();

        replay.playback_mut().play();
        for index in seeks {
            replay.playback_mut().seek(index);
            replay.advance(Duration::from_millis(400));
            prop_assert_eq!(*replay.viewport(), initial);
        }
    }

    #[test]
    fn prop_battle_positions_stay_on_screen(entries in battle_strategy(), index in 0usize..64) {
        let mut replay = BattleReplay::new(entries, None, 800.0, 600.0).unwrap();
        replay.playback_mut().seek(index);

        for p in &replay.current().participants {
            let at = replay.viewport().to_screen(replay.position_of(&p.player_id).unwrap());
            prop_assert!((0.0..=800.0).contains(&at.x) && (0.0..=600.0).contains(&at.y));
        }
    }
}
