//! Galaxy map engine.
//!
//! [`GalaxyView`] owns everything the map needs between frames: the system
//! snapshot, the camera, the starfield, the activity overlay and the detail
//! panel. It is mutated in place by input handlers and by the per-frame
//! [`GalaxyView::advance`], both on the same thread, and produces a
//! [`Scene`] on demand.

pub mod camera;
pub mod grid;
pub mod overlay;
pub mod panel;
pub mod starfield;

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use nebula_proto::{
    activity::ActivityEvent,
    map::{GalaxyMap, MapSystem, SystemDetail},
};

use self::{
    camera::Camera,
    overlay::{ActivityOverlay, OverlayConfig},
    panel::PoiPanel,
    starfield::Starfield,
};
use crate::scene::{Align, Color, Point, Scene, distance};

/// A click counts as a hit within this multiple of a node's visual radius.
pub const HIT_RADIUS_MULTIPLE: f64 = 3.0;

/// Stars in the background.
const STAR_COUNT: usize = 400;

/// Starfield seed. Fixed so every session sees the same sky.
const STAR_SEED: u64 = 0x6e65_6275_6c61;

/// Screen margin kept around the galaxy on first fit.
const FIT_MARGIN: f64 = 40.0;

/// Zoom above which every system is labelled.
const LABEL_ZOOM: f64 = 0.6;

/// Base node radius in pixels at zoom 1, before online-count growth.
pub fn node_radius(system: &MapSystem) -> f64 {
    let growth = f64::from(system.online.min(30)).sqrt() * 1.2;
    let home = if system.is_home { 1.5 } else { 0.0 };
    3.0 + growth + home
}

/// Node radius on screen at the given zoom.
pub fn visual_radius(system: &MapSystem, zoom: f64) -> f64 {
    node_radius(system) * zoom.sqrt().clamp(0.6, 2.5)
}

fn system_color(system: &MapSystem) -> Color {
    system.empire_color.as_deref().and_then(Color::from_hex).unwrap_or(Color::GRAY)
}

/// Stable per-system phase so pulses do not beat in unison.
fn phase_of(id: &str) -> f64 {
    let hash = id.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    f64::from(hash % 628) / 100.0
}

/// Interactive galaxy map.
#[derive(Debug, Clone)]
pub struct GalaxyView {
    systems: Vec<MapSystem>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    camera: Camera,
    starfield: Starfield,
    overlay: ActivityOverlay,
    selected: Option<String>,
    hovered: Option<String>,
    panel: Option<PoiPanel>,
    clock: Duration,
    fitted: bool,
}

impl GalaxyView {
    /// Empty map for a viewport.
    pub fn new(width: f64, height: f64, config: OverlayConfig) -> Self {
        Self {
            systems: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            camera: Camera::new(width, height),
            starfield: Starfield::generate(STAR_SEED, STAR_COUNT),
            overlay: ActivityOverlay::new(config),
            selected: None,
            hovered: None,
            panel: None,
            clock: Duration::ZERO,
            fitted: false,
        }
    }

    /// Replace the system snapshot.
    ///
    /// The first snapshot frames the camera on the whole galaxy. Later
    /// snapshots keep the camera and, if the system still exists, the
    /// selection.
    pub fn set_map(&mut self, map: GalaxyMap) {
        self.systems = map.systems;
        self.index = self.systems.iter().enumerate().map(|(i, s)| (s.id.clone(), i)).collect();

        let mut seen = HashSet::new();
        self.edges = self
            .systems
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.connections.iter().map(move |to| (i, to)))
            .filter_map(|(i, to)| {
                let j = *self.index.get(to)?;
                let key = (i.min(j), i.max(j));
                (i != j && seen.insert(key)).then_some(key)
            })
            .collect();

        if self.selected.as_ref().is_some_and(|id| !self.index.contains_key(id)) {
            self.selected = None;
            self.panel = None;
        }

        if !self.fitted
            && let Some((min, max)) = self.world_bounds()
        {
            self.camera.fit(min, max, FIT_MARGIN);
            self.fitted = true;
        }
        tracing::debug!(systems = self.systems.len(), edges = self.edges.len(), "map refreshed");
    }

    /// All systems.
    pub fn systems(&self) -> &[MapSystem] {
        &self.systems
    }

    /// Deduplicated connections as index pairs.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Look up a system by id.
    pub fn system(&self, id: &str) -> Option<&MapSystem> {
        self.index.get(id).map(|&i| &self.systems[i])
    }

    /// Camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera, for input handlers.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Activity overlay.
    pub fn overlay(&self) -> &ActivityOverlay {
        &self.overlay
    }

    /// Activity overlay, for tracking changes.
    pub fn overlay_mut(&mut self) -> &mut ActivityOverlay {
        &mut self.overlay
    }

    /// Selected system id.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Hovered system id.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Detail panel for the selected system.
    pub fn panel(&self) -> Option<&PoiPanel> {
        self.panel.as_ref()
    }

    /// Detail panel, for expand/collapse.
    pub fn panel_mut(&mut self) -> Option<&mut PoiPanel> {
        self.panel.as_mut()
    }

    /// Animation time.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Advance one animation frame.
    pub fn advance(&mut self, dt: Duration) {
        self.clock += dt;
        self.camera.step(dt);
        self.overlay.prune(self.clock);
    }

    /// Resize the viewport.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.camera.resize(width, height);
    }

    /// Nearest system under a screen point, if within hit range.
    pub fn hit_test(&self, screen: Point) -> Option<&MapSystem> {
        let zoom = self.camera.zoom();
        self.systems
            .iter()
            .filter_map(|s| {
                let d = distance(self.camera.world_to_screen(Point::new(s.x, s.y)), screen);
                (d <= HIT_RADIUS_MULTIPLE * visual_radius(s, zoom)).then_some((s, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    /// Update hover state from the pointer position.
    pub fn hover(&mut self, screen: Point) {
        self.hovered = self.hit_test(screen).map(|s| s.id.clone());
    }

    /// Handle a click. Returns the system whose detail must be fetched.
    ///
    /// Clicking empty space clears the selection.
    pub fn click(&mut self, screen: Point) -> Option<String> {
        match self.hit_test(screen).map(|s| s.id.clone()) {
            Some(id) => self.select(&id).then_some(id),
            None => {
                self.selected = None;
                self.panel = None;
                None
            },
        }
    }

    /// Select a system and start its detail fetch. Returns `false` if the
    /// system is unknown or already selected.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(system) = self.system(id) else {
            return false;
        };
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        let at = Point::new(system.x, system.y);
        self.camera.focus_on(at);
        self.selected = Some(id.to_string());
        self.panel = Some(PoiPanel::loading(id));
        true
    }

    /// Deliver a system detail fetch result.
    pub fn resolve_detail(&mut self, system_id: &str, result: Result<SystemDetail, String>) {
        if let Some(panel) = self.panel.as_mut() {
            panel.resolve(system_id, result);
        }
    }

    /// Handle a live activity event.
    pub fn push_activity(&mut self, event: &ActivityEvent) {
        self.overlay.push(event, self.clock);
    }

    /// Build the frame.
    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new();
        let t = self.clock.as_secs_f64();

        self.starfield.draw(&mut scene, &self.camera, t);
        grid::draw(&mut scene, &self.camera);
        self.draw_edges(&mut scene);
        self.draw_travel_paths(&mut scene);
        self.draw_nodes(&mut scene, t);
        self.draw_pings(&mut scene);
        scene
    }

    fn screen_of(&self, system: &MapSystem) -> Point {
        self.camera.world_to_screen(Point::new(system.x, system.y))
    }

    fn world_bounds(&self) -> Option<(Point, Point)> {
        let first = self.systems.first()?;
        let init = (Point::new(first.x, first.y), Point::new(first.x, first.y));
        Some(self.systems.iter().fold(init, |(min, max), s| {
            (Point::new(min.x.min(s.x), min.y.min(s.y)), Point::new(max.x.max(s.x), max.y.max(s.y)))
        }))
    }

    fn draw_edges(&self, scene: &mut Scene) {
        let color = Color::rgb(70, 90, 140).fade(0.6);
        for &(i, j) in &self.edges {
            let a = self.screen_of(&self.systems[i]);
            let b = self.screen_of(&self.systems[j]);
            scene.line(a, b, color, 1.0);
        }
    }

    fn draw_travel_paths(&self, scene: &mut Scene) {
        for username in self.overlay.tracked() {
            let Some(history) = self.overlay.history(username) else {
                continue;
            };
            let points: Vec<Point> =
                history.iter().filter_map(|id| self.system(id)).map(|s| self.screen_of(s)).collect();
            let segments = points.len().saturating_sub(1);
            for (k, pair) in points.windows(2).enumerate() {
                // Older hops fade out
                let age = (k + 1) as f64 / segments as f64;
                scene.dashed_line(pair[0], pair[1], Color::CYAN.fade(0.3 + 0.7 * age), 2.0);
            }
        }
    }

    fn draw_nodes(&self, scene: &mut Scene, t: f64) {
        let zoom = self.camera.zoom();

        for system in &self.systems {
            let at = self.screen_of(system);
            let r = visual_radius(system, zoom);
            let color = system_color(system);
            let phase = phase_of(&system.id);

            if system.online > 0 {
                let pulse = 0.5 + 0.5 * (t * 2.0 + phase).sin();
                let intensity = (f64::from(system.online.min(20)) / 20.0).max(0.2);
                scene.disc(at, r * (2.0 + 0.6 * pulse), color.fade(0.15 + 0.2 * intensity * pulse));
            }
            if system.is_stronghold {
                let pulse = 0.5 + 0.5 * (t * 3.0 + phase).sin();
                scene.ring(at, r * 1.8, Color::RED.fade(0.5 + 0.5 * pulse));
            }
            if system.is_home {
                scene.ring(at, r * 1.4, Color::GREEN);
            }

            scene.disc(at, r, color);
            if system.has_station {
                let s = (r * 0.6).max(1.0);
                scene.rect(Point::new(at.x - s / 2.0, at.y - s / 2.0), s, s, Color::WHITE);
            }

            let selected = self.selected.as_deref() == Some(system.id.as_str());
            let hovered = self.hovered.as_deref() == Some(system.id.as_str());
            if selected {
                scene.ring(at, r * 2.5, Color::WHITE);
            }
            if zoom >= LABEL_ZOOM || selected || hovered {
                let label = if system.online > 0 {
                    format!("{} ({})", system.name, system.online)
                } else {
                    system.name.clone()
                };
                scene.text(Point::new(at.x, at.y + r + 10.0), label, Color::WHITE.fade(0.85), 11.0, Align::Center);
            }
        }
    }

    fn draw_pings(&self, scene: &mut Scene) {
        let duration = self.overlay.config().ping_duration;
        let now = self.clock;

        for ping in self.overlay.pings() {
            let Some(system) = self.system(&ping.system_id) else {
                continue;
            };
            let at = self.screen_of(system);
            let color = ping.kind.color();
            for ring in ping.rings(now, duration) {
                scene.ring(at, 6.0 + ring.progress * 40.0, color.fade(ring.alpha));
            }
            scene.disc(at, 8.0, Color::WHITE.fade(ping.flash_alpha(now, duration)));
        }
    }
}
