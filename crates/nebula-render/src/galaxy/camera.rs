//! Pan/zoom camera with target easing.
//!
//! Input never moves the camera directly. Wheel, pinch and drag update the
//! *target* offset and zoom; [`Camera::step`] eases the live values toward
//! the target once per animation frame. Hit-testing and drawing always use
//! the live values.
//!
//! ```text
//! screen = center + (world + offset) * zoom
//! world  = (screen - center) / zoom - offset
//! ```

use std::time::Duration;

use crate::scene::Point;

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.05;

/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 8.0;

/// Exponential approach rate, per second.
pub const EASE_RATE: f64 = 10.0;

/// Wheel deltas beyond this are clamped.
pub const MAX_WHEEL_DELTA: f64 = 120.0;

/// Zoom change per unit of wheel delta, in natural-log space.
pub const WHEEL_SENSITIVITY: f64 = 0.002;

/// Residual below which easing snaps to the target.
const SNAP_EPSILON: f64 = 1e-6;

/// Pan/zoom state.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Viewport width in pixels
    width: f64,
    /// Viewport height in pixels
    height: f64,
    /// Live view offset (world units)
    offset: Point,
    /// Live zoom
    zoom: f64,
    /// Offset the camera eases toward
    target_offset: Point,
    /// Zoom the camera eases toward
    target_zoom: f64,
}

impl Camera {
    /// Camera centered on the world origin at zoom 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            offset: Point::default(),
            zoom: 1.0,
            target_offset: Point::default(),
            target_zoom: 1.0,
        }
    }

    /// Screen center.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Viewport size.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Live view offset.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Live zoom.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Target zoom.
    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }

    /// Target offset.
    pub fn target_offset(&self) -> Point {
        self.target_offset
    }

    /// Whether live values have reached the target.
    pub fn is_settled(&self) -> bool {
        self.offset == self.target_offset && self.zoom == self.target_zoom
    }

    /// Resize the viewport. World points keep their offset from center.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// World to screen using the live camera.
    pub fn world_to_screen(&self, world: Point) -> Point {
        project(self.center(), self.offset, self.zoom, world)
    }

    /// Screen to world using the live camera.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        unproject(self.center(), self.offset, self.zoom, screen)
    }

    /// Visible world rectangle as `(min, max)`.
    pub fn visible_world(&self) -> (Point, Point) {
        let a = self.screen_to_world(Point::new(0.0, 0.0));
        let b = self.screen_to_world(Point::new(self.width, self.height));
        (Point::new(a.x.min(b.x), a.y.min(b.y)), Point::new(a.x.max(b.x), a.y.max(b.y)))
    }

    /// Snap live and target values to a given view.
    pub fn jump_to(&mut self, offset: Point, zoom: f64) {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = offset;
        self.zoom = zoom;
        self.target_offset = offset;
        self.target_zoom = zoom;
    }

    /// Ease toward centering a world point.
    pub fn focus_on(&mut self, world: Point) {
        self.target_offset = Point::new(-world.x, -world.y);
    }

    /// Fit a world rectangle into the viewport, immediately.
    pub fn fit(&mut self, min: Point, max: Point, margin: f64) {
        let span_x = (max.x - min.x).max(1.0);
        let span_y = (max.y - min.y).max(1.0);
        let usable_w = (self.width - 2.0 * margin).max(1.0);
        let usable_h = (self.height - 2.0 * margin).max(1.0);
        let zoom = (usable_w / span_x).min(usable_h / span_y);
        let mid = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        self.jump_to(Point::new(-mid.x, -mid.y), zoom);
    }

    /// Drag by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.target_offset.x += dx / self.target_zoom;
        self.target_offset.y += dy / self.target_zoom;
    }

    /// Multiply the target zoom, keeping the world point under `cursor`
    /// fixed on screen once easing completes.
    pub fn zoom_at(&mut self, cursor: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let center = self.center();
        let anchor = unproject(center, self.target_offset, self.target_zoom, cursor);
        let zoom = (self.target_zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        self.target_zoom = zoom;
        self.target_offset = Point::new(
            (cursor.x - center.x) / zoom - anchor.x,
            (cursor.y - center.y) / zoom - anchor.y,
        );
    }

    /// Mouse wheel. Positive delta zooms out.
    pub fn wheel(&mut self, cursor: Point, delta: f64) {
        let delta = delta.clamp(-MAX_WHEEL_DELTA, MAX_WHEEL_DELTA);
        self.zoom_at(cursor, (-delta * WHEEL_SENSITIVITY).exp());
    }

    /// Two-finger pinch between successive finger distances.
    pub fn pinch(&mut self, midpoint: Point, previous_distance: f64, distance: f64) {
        if previous_distance <= 0.0 || distance <= 0.0 {
            return;
        }
        self.zoom_at(midpoint, distance / previous_distance);
    }

    /// Advance easing by one frame.
    pub fn step(&mut self, dt: Duration) {
        let k = 1.0 - (-EASE_RATE * dt.as_secs_f64()).exp();
        self.offset.x = approach(self.offset.x, self.target_offset.x, k);
        self.offset.y = approach(self.offset.y, self.target_offset.y, k);
        self.zoom = approach(self.zoom, self.target_zoom, k);
    }
}

fn approach(value: f64, target: f64, k: f64) -> f64 {
    let next = value + (target - value) * k;
    if (target - next).abs() < SNAP_EPSILON { target } else { next }
}

fn project(center: Point, offset: Point, zoom: f64, world: Point) -> Point {
    Point::new(center.x + (world.x + offset.x) * zoom, center.y + (world.y + offset.y) * zoom)
}

fn unproject(center: Point, offset: Point, zoom: f64, screen: Point) -> Point {
    Point::new((screen.x - center.x) / zoom - offset.x, (screen.y - center.y) / zoom - offset.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    fn settle(camera: &mut Camera) {
        for _ in 0..600 {
            camera.step(Duration::from_millis(16));
        }
    }

    #[test]
    fn origin_maps_to_center() {
        let camera = Camera::new(800.0, 600.0);
        assert_eq!(camera.world_to_screen(Point::new(0.0, 0.0)), Point::new(400.0, 300.0));
    }

    #[test]
    fn input_moves_only_target() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.wheel(Point::new(400.0, 300.0), -100.0);

        assert_eq!(camera.zoom(), 1.0);
        assert!(camera.target_zoom() > 1.0);

        camera.step(Duration::from_millis(16));
        assert!(camera.zoom() > 1.0 && camera.zoom() < camera.target_zoom());
    }

    #[test]
    fn zoom_keeps_cursor_anchor() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.jump_to(Point::new(30.0, -20.0), 1.5);
        let cursor = Point::new(120.0, 450.0);
        let anchor = camera.screen_to_world(cursor);

        camera.zoom_at(cursor, 2.0);
        settle(&mut camera);

        assert!(camera.is_settled());
        assert!(close(camera.world_to_screen(anchor), cursor));
    }

    #[test]
    fn wheel_delta_is_clamped() {
        let mut a = Camera::new(800.0, 600.0);
        let mut b = Camera::new(800.0, 600.0);
        a.wheel(Point::new(0.0, 0.0), 10_000.0);
        b.wheel(Point::new(0.0, 0.0), MAX_WHEEL_DELTA);
        assert_eq!(a.target_zoom(), b.target_zoom());
    }

    #[test]
    fn zoom_is_bounded() {
        let mut camera = Camera::new(800.0, 600.0);
        for _ in 0..100 {
            camera.zoom_at(Point::new(400.0, 300.0), 3.0);
        }
        assert_eq!(camera.target_zoom(), MAX_ZOOM);
    }

    #[test]
    fn pinch_uses_distance_ratio() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.pinch(Point::new(400.0, 300.0), 100.0, 150.0);
        assert!((camera.target_zoom() - 1.5).abs() < 1e-9);

        camera.pinch(Point::new(400.0, 300.0), 0.0, 150.0);
        assert!((camera.target_zoom() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn pan_is_scaled_by_zoom() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.jump_to(Point::default(), 2.0);
        camera.pan_by(20.0, -10.0);
        assert_eq!(camera.target_offset(), Point::new(10.0, -5.0));
    }

    #[test]
    fn fit_frames_rectangle() {
        let mut camera = Camera::new(800.0, 600.0);
        camera.fit(Point::new(-100.0, -50.0), Point::new(100.0, 50.0), 0.0);

        assert!(close(camera.world_to_screen(Point::new(-100.0, 0.0)), Point::new(0.0, 300.0)));
        assert!(close(camera.world_to_screen(Point::new(100.0, 0.0)), Point::new(800.0, 300.0)));
    }
}
