//! Background starfield.
//!
//! Stars are generated once from a seed so the sky is identical across
//! frames and sessions. Each star twinkles on its own phase and drifts with
//! the camera at a reduced parallax rate.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    galaxy::camera::Camera,
    scene::{Color, Point, Scene},
};

/// Fraction of camera movement applied to stars.
const PARALLAX: f64 = 0.15;

/// One background star, in normalized `[0, 1)` sky coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Radius in pixels.
    pub size: f64,
    /// Base brightness in `[0, 1]`.
    pub brightness: f64,
    /// Twinkle phase offset, radians.
    pub phase: f64,
    /// Twinkle speed, radians per second.
    pub speed: f64,
}

impl Star {
    /// Brightness at animation time `t` seconds.
    pub fn brightness_at(&self, t: f64) -> f64 {
        let twinkle = 0.5 + 0.5 * (t * self.speed + self.phase).sin();
        (self.brightness * (0.6 + 0.4 * twinkle)).clamp(0.0, 1.0)
    }
}

/// Seeded collection of stars.
#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    /// Generate `count` stars from `seed`.
    pub fn generate(seed: u64, count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| Star {
                x: rng.gen_range(0.0..1.0),
                y: rng.gen_range(0.0..1.0),
                size: rng.gen_range(0.4..1.6),
                brightness: rng.gen_range(0.25..1.0),
                phase: rng.gen_range(0.0..TAU),
                speed: rng.gen_range(0.5..3.0),
            })
            .collect();
        Self { stars }
    }

    /// All stars.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Draw the sky for the given camera at animation time `t` seconds.
    pub fn draw(&self, scene: &mut Scene, camera: &Camera, t: f64) {
        let (width, height) = camera.size();
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let shift = camera.offset();
        let zoom = camera.zoom();

        for star in &self.stars {
            let x = (star.x * width + shift.x * zoom * PARALLAX).rem_euclid(width);
            let y = (star.y * height + shift.y * zoom * PARALLAX).rem_euclid(height);
            scene.disc(Point::new(x, y), star.size, Color::WHITE.fade(star.brightness_at(t)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sky() {
        assert_eq!(Starfield::generate(7, 50), Starfield::generate(7, 50));
        assert_ne!(Starfield::generate(7, 50), Starfield::generate(8, 50));
    }

    #[test]
    fn stars_stay_on_screen_under_pan() {
        let sky = Starfield::generate(1, 100);
        let mut camera = Camera::new(320.0, 200.0);
        camera.jump_to(Point::new(12_345.0, -9_876.0), 3.0);

        let mut scene = Scene::new();
        sky.draw(&mut scene, &camera, 1.0);

        for shape in &scene.shapes {
            if let crate::scene::Shape::Circle { center, .. } = shape {
                assert!((0.0..=320.0).contains(&center.x));
                assert!((0.0..=200.0).contains(&center.y));
            }
        }
    }

    #[test]
    fn stars_spread_over_unit_square() {
        let sky = Starfield::generate(11, 200);
        for star in sky.stars() {
            assert!((0.0..1.0).contains(&star.x));
            assert!((0.0..1.0).contains(&star.y));
        }
        assert!(sky.stars().iter().any(|s| s.x < 0.5) && sky.stars().iter().any(|s| s.x >= 0.5));
    }

    #[test]
    fn twinkle_stays_in_range() {
        let sky = Starfield::generate(3, 20);
        for star in sky.stars() {
            for step in 0..50 {
                let b = star.brightness_at(f64::from(step) * 0.1);
                assert!((0.0..=1.0).contains(&b));
            }
        }
    }
}
