//! Multi-scale background grid.
//!
//! Several grid spacings are drawn at once. Each fades in as its on-screen
//! spacing grows past a threshold, so zooming never shows a grid that is too
//! dense to read or too sparse to be useful.

use crate::{
    galaxy::camera::Camera,
    scene::{Color, Point, Scene},
};

/// World-unit spacings, finest first.
pub const GRID_SPACINGS: [f64; 3] = [100.0, 500.0, 2500.0];

/// On-screen spacing at which a level starts to appear.
const FADE_START_PX: f64 = 12.0;

/// On-screen spacing at which a level is fully visible.
const FADE_END_PX: f64 = 60.0;

/// Lines per axis above which a level is skipped.
const MAX_LINES: usize = 400;

const GRID_COLOR: Color = Color::rgb(60, 80, 120);

/// Opacity of a grid level at the given zoom, in `[0, 1]`.
pub fn level_alpha(spacing: f64, zoom: f64) -> f64 {
    let px = spacing * zoom;
    ((px - FADE_START_PX) / (FADE_END_PX - FADE_START_PX)).clamp(0.0, 1.0)
}

/// Draw every visible grid level.
pub fn draw(scene: &mut Scene, camera: &Camera) {
    let (min, max) = camera.visible_world();
    let (width, height) = camera.size();

    for (level, spacing) in GRID_SPACINGS.iter().copied().enumerate() {
        let alpha = level_alpha(spacing, camera.zoom());
        if alpha <= 0.0 {
            continue;
        }
        let first_x = (min.x / spacing).floor() as i64;
        let last_x = (max.x / spacing).ceil() as i64;
        let first_y = (min.y / spacing).floor() as i64;
        let last_y = (max.y / spacing).ceil() as i64;
        let count = (last_x - first_x).max(0) as usize + (last_y - first_y).max(0) as usize;
        if count > MAX_LINES {
            continue;
        }

        // Coarser levels draw brighter and wider
        let color = GRID_COLOR.fade(alpha * (0.25 + 0.15 * level as f64));
        let width_px = 1.0 + level as f64 * 0.5;

        for i in first_x..=last_x {
            let sx = camera.world_to_screen(Point::new(i as f64 * spacing, 0.0)).x;
            scene.line(Point::new(sx, 0.0), Point::new(sx, height), color, width_px);
        }
        for j in first_y..=last_y {
            let sy = camera.world_to_screen(Point::new(0.0, j as f64 * spacing)).y;
            scene.line(Point::new(0.0, sy), Point::new(width, sy), color, width_px);
        }
    }
}
