//! Stable battle viewport.
//!
//! The bounding box covers every participant position across the whole
//! battle, so the camera never moves while the replay plays.

use nebula_proto::battle::BattleEntry;

use crate::scene::Point;

/// World-unit margin added around the extreme positions.
pub const BOUNDS_PADDING: f64 = 50.0;

/// Share of the screen the padded box may fill.
pub const FILL_FACTOR: f64 = 0.9;

/// World-coordinate bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Point,
    /// Maximum corner.
    pub max: Point,
}

impl Bounds {
    /// Padded box around every participant in every entry.
    ///
    /// Returns `None` if no entry has participants.
    pub fn of_battle(entries: &[BattleEntry]) -> Option<Self> {
        let mut positions = entries.iter().flat_map(|e| e.participants.iter()).map(|p| p.position());
        let first = positions.next()?;
        let (min, max) = positions.fold((first, first), |(min, max), p| {
            (Point::new(min.x.min(p.x), min.y.min(p.y)), Point::new(max.x.max(p.x), max.y.max(p.y)))
        });
        Some(Self {
            min: Point::new(min.x - BOUNDS_PADDING, min.y - BOUNDS_PADDING),
            max: Point::new(max.x + BOUNDS_PADDING, max.y + BOUNDS_PADDING),
        })
    }

    /// Horizontal extent, never zero.
    pub fn range_x(&self) -> f64 {
        (self.max.x - self.min.x).max(1.0)
    }

    /// Vertical extent, never zero.
    pub fn range_y(&self) -> f64 {
        (self.max.y - self.min.y).max(1.0)
    }

    /// Box center.
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

/// Fixed world-to-screen mapping for one battle and screen size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    width: f64,
    height: f64,
    scale: f64,
}

impl Viewport {
    /// Fit `bounds` into a `width` x `height` screen.
    pub fn new(bounds: Bounds, width: f64, height: f64) -> Self {
        let scale = (width / bounds.range_x()).min(height / bounds.range_y()) * FILL_FACTOR;
        Self { bounds, width, height, scale: scale.max(f64::MIN_POSITIVE) }
    }

    /// World bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Pixels per world unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen size.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// World to screen. The box center maps to the screen center.
    pub fn to_screen(&self, world: Point) -> Point {
        let c = self.bounds.center();
        Point::new(
            self.width / 2.0 + (world.x - c.x) * self.scale,
            self.height / 2.0 + (world.y - c.y) * self.scale,
        )
    }

    /// Screen to world.
    pub fn to_world(&self, screen: Point) -> Point {
        let c = self.bounds.center();
        Point::new(
            (screen.x - self.width / 2.0) / self.scale + c.x,
            (screen.y - self.height / 2.0) / self.scale + c.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use nebula_proto::battle::ParticipantSnapshot;

    use super::*;

    fn at(x: f64, y: f64) -> ParticipantSnapshot {
        ParticipantSnapshot { x, y, ..ParticipantSnapshot::default() }
    }

    #[test]
    fn bounds_cover_every_tick() {
        let entries = vec![
            BattleEntry { tick: 1, participants: vec![at(0.0, 0.0), at(10.0, 5.0)], events: vec![] },
            BattleEntry { tick: 2, participants: vec![at(-30.0, 40.0)], events: vec![] },
        ];
        let bounds = Bounds::of_battle(&entries).unwrap();

        assert_eq!(bounds.min, Point::new(-80.0, -50.0));
        assert_eq!(bounds.max, Point::new(60.0, 90.0));
    }

    #[test]
    fn no_participants_no_bounds() {
        assert!(Bounds::of_battle(&[BattleEntry::default()]).is_none());
    }

    #[test]
    fn padded_box_fits_screen() {
        let bounds = Bounds { min: Point::new(0.0, 0.0), max: Point::new(200.0, 100.0) };
        let viewport = Viewport::new(bounds, 400.0, 400.0);

        assert!((viewport.scale() - 1.8).abs() < 1e-9);
        let left = viewport.to_screen(bounds.min);
        let right = viewport.to_screen(bounds.max);
        assert!(left.x >= 0.0 && right.x <= 400.0);
        assert!(left.y >= 0.0 && right.y <= 400.0);
    }

    #[test]
    fn single_point_battle_has_finite_scale() {
        let entries = vec![BattleEntry { tick: 1, participants: vec![at(5.0, 5.0)], events: vec![] }];
        let viewport = Viewport::new(Bounds::of_battle(&entries).unwrap(), 300.0, 200.0);
        assert!(viewport.scale().is_finite());
        assert_eq!(viewport.to_screen(Point::new(5.0, 5.0)), Point::new(150.0, 100.0));
    }
}
