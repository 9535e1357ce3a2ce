//! Battle replay engine.
//!
//! [`BattleReplay`] holds a fully loaded battle and a playback cursor. The
//! viewport is computed once from every position in the battle, so
//! scrubbing or playing never moves the camera.

pub mod feed;
pub mod loader;
pub mod playback;
pub mod viewport;

use std::time::Duration;

use nebula_proto::battle::{BattleEntry, BattleEvent, BattleInfo, ParticipantSnapshot};

use self::{
    feed::{FeedLine, FeedScroll, Names},
    playback::Playback,
    viewport::{BOUNDS_PADDING, Bounds, Viewport},
};
use crate::{
    error::LoadError,
    scene::{Align, Color, Point, Scene, lerp},
};

/// Zone bands from innermost to outermost: name and half-width in world units.
pub const ZONE_BANDS: [(&str, f64); 4] =
    [("engaged", 100.0), ("inner", 250.0), ("mid", 450.0), ("outer", 700.0)];

/// How long attack and kill overlays animate after a tick is shown.
pub const OVERLAY_DURATION: Duration = Duration::from_millis(900);

/// Height a damage number rises over its lifetime, in pixels.
const DAMAGE_RISE: f64 = 24.0;

/// Final radius of a kill explosion ring, in pixels.
const KILL_RING_RADIUS: f64 = 36.0;

/// Ship marker radius in pixels.
const SHIP_RADIUS: f64 = 6.0;

/// Colors handed out to sides in order of first appearance.
const SIDE_COLORS: [Color; 5] = [Color::CYAN, Color::RED, Color::YELLOW, Color::GREEN, Color::PURPLE];

/// Zone band fills, innermost first.
const ZONE_COLORS: [Color; 4] = [
    Color::rgb(120, 40, 40),
    Color::rgb(90, 50, 40),
    Color::rgb(50, 50, 70),
    Color::rgb(30, 30, 50),
];

/// Average position of a tick's participants.
fn centroid(participants: &[ParticipantSnapshot]) -> Option<Point> {
    if participants.is_empty() {
        return None;
    }
    let n = participants.len() as f64;
    let (x, y) = participants.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Some(Point::new(x / n, y / n))
}

/// A loaded battle and its playback state.
#[derive(Debug, Clone)]
pub struct BattleReplay {
    entries: Vec<BattleEntry>,
    info: Option<BattleInfo>,
    names: Names,
    sides: Vec<String>,
    origin: Point,
    viewport: Viewport,
    playback: Playback,
    scroll: FeedScroll,
    shown_index: usize,
    overlay_age: Duration,
}

impl BattleReplay {
    /// Prepare a replay on a `width` x `height` screen.
    ///
    /// # Errors
    ///
    /// - `LoadError::Empty` if `entries` is empty.
    pub fn new(
        entries: Vec<BattleEntry>,
        info: Option<BattleInfo>,
        width: f64,
        height: f64,
    ) -> Result<Self, LoadError> {
        let first = entries.first().ok_or(LoadError::Empty)?;

        let origin = info
            .as_ref()
            .and_then(|i| i.origin)
            .or_else(|| centroid(&first.participants))
            .unwrap_or_default();
        let bounds = Bounds::of_battle(&entries).unwrap_or(Bounds {
            min: Point::new(origin.x - BOUNDS_PADDING, origin.y - BOUNDS_PADDING),
            max: Point::new(origin.x + BOUNDS_PADDING, origin.y + BOUNDS_PADDING),
        });

        let mut sides: Vec<String> = Vec::new();
        for side in entries.iter().flat_map(|e| &e.participants).filter_map(|p| p.side.as_ref()) {
            if !sides.contains(side) {
                sides.push(side.clone());
            }
        }

        tracing::debug!(ticks = entries.len(), sides = sides.len(), "battle replay ready");

        Ok(Self {
            names: Names::of_battle(&entries),
            playback: Playback::new(entries.len()),
            entries,
            info,
            sides,
            origin,
            viewport: Viewport::new(bounds, width, height),
            scroll: FeedScroll::default(),
            shown_index: 0,
            overlay_age: Duration::ZERO,
        })
    }

    /// All entries in tick order.
    pub fn entries(&self) -> &[BattleEntry] {
        &self.entries
    }

    /// Battle metadata, if known.
    pub fn info(&self) -> Option<&BattleInfo> {
        self.info.as_ref()
    }

    /// Zone band center in world coordinates.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// World-to-screen mapping.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Playback cursor.
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Playback controls.
    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    /// Feed scroll state.
    pub fn scroll(&self) -> &FeedScroll {
        &self.scroll
    }

    /// Feed scroll controls.
    pub fn scroll_mut(&mut self) -> &mut FeedScroll {
        &mut self.scroll
    }

    /// Display name for a participant id.
    pub fn username<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.names.get(player_id)
    }

    /// Entry at the playback cursor.
    pub fn current(&self) -> &BattleEntry {
        &self.entries[self.playback.index()]
    }

    /// Entry before the playback cursor, if any.
    pub fn previous(&self) -> Option<&BattleEntry> {
        self.playback.index().checked_sub(1).map(|i| &self.entries[i])
    }

    /// Feed lines for every tick up to the cursor.
    pub fn feed(&self) -> Vec<FeedLine> {
        feed::lines_through(&self.entries, self.playback.index(), &self.names)
    }

    /// Refit to a new screen size. Bounds are unchanged.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(self.viewport.bounds(), width, height);
    }

    /// Advance playback and overlay animation by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.playback.advance(dt);
        if self.playback.index() == self.shown_index {
            self.overlay_age = self.overlay_age.saturating_add(dt);
        } else {
            self.shown_index = self.playback.index();
            self.overlay_age = Duration::ZERO;
        }
    }

    /// Overlay animation progress in `0..=1` for the current tick.
    fn overlay_progress(&self) -> f64 {
        if self.playback.index() != self.shown_index {
            return 0.0;
        }
        (self.overlay_age.as_secs_f64() / OVERLAY_DURATION.as_secs_f64()).min(1.0)
    }

    /// Interpolated world position of a participant at the cursor.
    pub fn position_of(&self, player_id: &str) -> Option<Point> {
        let current = self.current().participants.iter().find(|p| p.player_id == player_id)?;
        let progress = self.playback.progress();
        if progress >= 1.0 {
            return Some(current.position());
        }
        let previous = self
            .previous()
            .and_then(|e| e.participants.iter().find(|p| p.player_id == player_id))
            .map_or(current.position(), ParticipantSnapshot::position);
        Some(lerp(previous, current.position(), progress))
    }

    fn side_color(&self, side: Option<&str>) -> Color {
        side.and_then(|s| self.sides.iter().position(|known| known == s))
            .map_or(Color::WHITE, |i| SIDE_COLORS[i % SIDE_COLORS.len()])
    }

    /// Draw list for the current frame.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new();
        self.draw_zones(&mut scene);
        self.draw_participants(&mut scene);
        self.draw_events(&mut scene);

        let (width, _) = self.viewport.size();
        let label = format!(
            "Tick {} ({}/{})  {}x",
            self.current().tick,
            self.playback.index() + 1,
            self.playback.len(),
            self.playback.speed()
        );
        scene.text(Point::new(width - 8.0, 16.0), label, Color::GRAY, 12.0, Align::Right);
        scene
    }

    fn draw_zones(&self, scene: &mut Scene) {
        let (_, height) = self.viewport.size();
        let center = self.viewport.to_screen(self.origin);
        let scale = self.viewport.scale();

        // Outermost first so inner bands paint over it.
        for (i, (name, half_width)) in ZONE_BANDS.iter().enumerate().rev() {
            let half = half_width * scale;
            scene.rect(Point::new(center.x - half, 0.0), half * 2.0, height, ZONE_COLORS[i].fade(0.35));
            for x in [center.x - half, center.x + half] {
                scene.text(Point::new(x, 12.0), *name, Color::DIM, 10.0, Align::Center);
            }
        }
        scene.line(Point::new(center.x, 0.0), Point::new(center.x, height), Color::DIM, 1.0);
    }

    fn draw_participants(&self, scene: &mut Scene) {
        for p in &self.current().participants {
            let Some(world) = self.position_of(&p.player_id) else {
                continue;
            };
            let at = self.viewport.to_screen(world);
            let name = self.names.get(&p.player_id);

            if p.is_destroyed() {
                scene.ring(at, SHIP_RADIUS, Color::GRAY);
                scene.text(Point::new(at.x, at.y + 16.0), name, Color::GRAY, 10.0, Align::Center);
                continue;
            }

            scene.disc(at, SHIP_RADIUS, self.side_color(p.side.as_deref()));
            if p.max_hull > 0 {
                let bar = 20.0;
                let fill = (p.hull.max(0) as f64 / p.max_hull as f64).min(1.0);
                let top = Point::new(at.x - bar / 2.0, at.y - SHIP_RADIUS - 6.0);
                scene.rect(top, bar, 2.0, Color::DIM);
                scene.rect(top, bar * fill, 2.0, Color::GREEN);
            }
            if p.max_shield > 0 && p.shield > 0 {
                let alpha = (p.shield as f64 / p.max_shield as f64).min(1.0);
                scene.ring(at, SHIP_RADIUS + 3.0, Color::BLUE.fade(alpha));
            }
            scene.text(Point::new(at.x, at.y + 16.0), name, Color::WHITE, 10.0, Align::Center);
        }
    }

    fn draw_events(&self, scene: &mut Scene) {
        let t = self.overlay_progress();
        for event in &self.current().events {
            match event {
                BattleEvent::Attack { attacker_id, target_id, damage, hit, .. } => {
                    let (Some(from), Some(to)) = (self.position_of(attacker_id), self.position_of(target_id))
                    else {
                        continue;
                    };
                    let (from, to) = (self.viewport.to_screen(from), self.viewport.to_screen(to));
                    if *hit {
                        scene.line(from, to, Color::ORANGE, 1.5);
                        let rise = Point::new(to.x, to.y - 10.0 - DAMAGE_RISE * t);
                        scene.text(rise, damage.to_string(), Color::YELLOW.fade(1.0 - t), 11.0, Align::Center);
                    } else {
                        scene.dashed_line(from, to, Color::GRAY, 1.0);
                    }
                },
                BattleEvent::Kill { victim_id, .. } => {
                    let Some(at) = self.position_of(victim_id) else {
                        continue;
                    };
                    let at = self.viewport.to_screen(at);
                    scene.ring(at, SHIP_RADIUS + KILL_RING_RADIUS * t, Color::ORANGE.fade(1.0 - t));
                },
                _ => {},
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;

    fn ship(id: &str, x: f64, y: f64, side: &str) -> ParticipantSnapshot {
        ParticipantSnapshot {
            player_id: id.into(),
            username: Some(id.to_uppercase()),
            x,
            y,
            hull: 50,
            max_hull: 100,
            status: "active".into(),
            side: Some(side.into()),
            ..ParticipantSnapshot::default()
        }
    }

    fn battle() -> Vec<BattleEntry> {
        vec![
            BattleEntry {
                tick: 10,
                participants: vec![ship("a", 0.0, 0.0, "red"), ship("b", 100.0, 0.0, "blue")],
                events: vec![BattleEvent::Join { player_id: "a".into(), side: None }],
            },
            BattleEntry {
                tick: 11,
                participants: vec![ship("a", 20.0, 0.0, "red"), ship("b", 100.0, 40.0, "blue")],
                events: vec![BattleEvent::Attack {
                    attacker_id: "a".into(),
                    target_id: "b".into(),
                    damage: 12,
                    hit: true,
                    weapon: None,
                }],
            },
            BattleEntry {
                tick: 12,
                participants: vec![ship("a", 40.0, 0.0, "red"), ship("b", 100.0, 80.0, "blue")],
                events: vec![BattleEvent::Kill { killer_id: "a".into(), victim_id: "b".into() }],
            },
        ]
    }

    fn replay() -> BattleReplay {
        BattleReplay::new(battle(), None, 800.0, 600.0).unwrap()
    }

    #[test]
    fn empty_battle_is_rejected() {
        let err = BattleReplay::new(vec![], None, 800.0, 600.0).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
        assert!(!err.is_retryable());
    }

    #[test]
    fn origin_defaults_to_first_tick_centroid() {
        assert_eq!(replay().origin(), Point::new(50.0, 0.0));
    }

    #[test]
    fn explicit_origin_wins() {
        let info = BattleInfo { origin: Some(Point::new(-300.0, 5.0)), ..BattleInfo::default() };
        let replay = BattleReplay::new(battle(), Some(info), 800.0, 600.0).unwrap();
        assert_eq!(replay.origin(), Point::new(-300.0, 5.0));
    }

    #[test]
    fn positions_interpolate_while_playing() {
        let mut replay = replay();
        replay.playback_mut().play();
        replay.advance(Duration::from_millis(500));

        assert_eq!(replay.playback().index(), 1);
        let a = replay.position_of("a").unwrap();
        assert!((a.x - 10.0).abs() < 1e-9);

        replay.playback_mut().pause();
        assert_eq!(replay.position_of("a"), Some(Point::new(20.0, 0.0)));
    }

    #[test]
    fn viewport_is_stable_across_ticks() {
        let mut replay = replay();
        let before = *replay.viewport();
        replay.playback_mut().last();
        replay.advance(Duration::from_millis(16));
        assert_eq!(*replay.viewport(), before);
    }

    #[test]
    fn zone_bands_are_mirrored_around_origin() {
        let replay = replay();
        let center = replay.viewport().to_screen(replay.origin());
        let bands: Vec<_> = replay
            .scene()
            .shapes
            .into_iter()
            .filter_map(|s| match s {
                Shape::Rect { origin, width, height, .. } if height > 100.0 => Some((origin.x, width)),
                _ => None,
            })
            .collect();

        assert_eq!(bands.len(), ZONE_BANDS.len());
        for (left, width) in bands {
            assert!((left + width / 2.0 - center.x).abs() < 1e-9);
        }
    }

    #[test]
    fn attack_draws_line_and_fading_damage() {
        let mut replay = replay();
        replay.playback_mut().seek(1);
        replay.advance(Duration::ZERO);

        let scene = replay.scene();
        let hit_line = |s: &Shape| matches!(s, Shape::Line { dashed: false, color, .. } if *color == Color::ORANGE);
        let damage = |s: &Shape| matches!(s, Shape::Text { text, .. } if text == "12");
        assert!(scene.shapes.iter().any(hit_line));
        assert!(scene.shapes.iter().any(damage));

        replay.advance(OVERLAY_DURATION);
        assert!(!replay.scene().shapes.iter().any(damage));
    }

    #[test]
    fn kill_draws_explosion_ring() {
        let mut replay = replay();
        replay.playback_mut().last();
        replay.advance(Duration::ZERO);
        replay.advance(Duration::from_millis(300));

        let ring = replay.scene().shapes.into_iter().any(|s| {
            matches!(s, Shape::Circle { radius, stroke: Some(_), fill: None, .. } if radius > SHIP_RADIUS + 3.0)
        });
        assert!(ring);
    }

    #[test]
    fn feed_follows_cursor() {
        let mut replay = replay();
        assert_eq!(replay.feed().len(), 1);
        replay.playback_mut().last();
        let feed = replay.feed();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[2].text, "A destroyed B");
    }

    #[test]
    fn sides_get_distinct_colors() {
        let replay = replay();
        assert_ne!(replay.side_color(Some("red")), replay.side_color(Some("blue")));
        assert_eq!(replay.side_color(None), Color::WHITE);
    }
}
