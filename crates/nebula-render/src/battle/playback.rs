//! Tick index, play state and animation progress for a replay.

use std::time::Duration;

/// Selectable speed multipliers.
pub const SPEEDS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];

/// Index into [`SPEEDS`] used by a fresh playback.
const DEFAULT_SPEED: usize = 1;

/// Real time one tick takes at 1x speed.
pub const TICK_DURATION: Duration = Duration::from_secs(1);

/// Playback cursor over `len` ticks.
///
/// While playing, `progress` climbs from 0 to 1 over one speed-scaled tick
/// duration and then moves to the next tick. Manual navigation lands with
/// progress at 1 so positions are shown without interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    len: usize,
    index: usize,
    playing: bool,
    speed: usize,
    progress: f64,
}

impl Playback {
    /// Paused at the first tick. `len` is clamped to at least one.
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1), index: 0, playing: false, speed: DEFAULT_SPEED, progress: 1.0 }
    }

    /// Current tick index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the final tick.
    pub fn last_index(&self) -> usize {
        self.len - 1
    }

    /// Number of ticks.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; playback covers at least one tick.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Playing or paused.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current speed multiplier.
    pub fn speed(&self) -> f64 {
        SPEEDS[self.speed]
    }

    /// Interpolation factor toward the current tick; 1 when paused.
    pub fn progress(&self) -> f64 {
        if self.playing { self.progress.clamp(0.0, 1.0) } else { 1.0 }
    }

    /// Fraction of the timeline already shown, for a scrubber.
    pub fn position(&self) -> f64 {
        if self.len == 1 { 1.0 } else { self.index as f64 / self.last_index() as f64 }
    }

    /// Start playing. The next frame steps to the following tick and
    /// animates toward it. Playing from the final tick restarts at the first.
    pub fn play(&mut self) {
        if self.index == self.last_index() {
            self.seek(0);
        }
        self.playing = true;
    }

    /// Stop at the current tick.
    pub fn pause(&mut self) {
        self.playing = false;
        self.progress = 1.0;
    }

    /// Flip between playing and paused.
    pub fn toggle(&mut self) {
        if self.playing { self.pause() } else { self.play() }
    }

    /// Select a speed from [`SPEEDS`]. Other values are rejected.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        match SPEEDS.iter().position(|s| *s == speed) {
            Some(i) => {
                self.speed = i;
                true
            },
            None => false,
        }
    }

    /// Move to the next speed, wrapping to the slowest.
    pub fn cycle_speed(&mut self) {
        self.speed = (self.speed + 1) % SPEEDS.len();
    }

    /// Jump to a tick index, clamped to the timeline.
    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.last_index());
        self.progress = 1.0;
    }

    /// Jump to the first tick.
    pub fn first(&mut self) {
        self.seek(0);
    }

    /// Step back one tick.
    pub fn prev(&mut self) {
        self.seek(self.index.saturating_sub(1));
    }

    /// Step forward one tick.
    pub fn next(&mut self) {
        self.seek(self.index + 1);
    }

    /// Jump to the final tick.
    pub fn last(&mut self) {
        self.seek(self.last_index());
    }

    /// Advance by `dt` of real time.
    ///
    /// Pauses once the final tick has finished animating.
    pub fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }
        self.progress += dt.as_secs_f64() * self.speed() / TICK_DURATION.as_secs_f64();
        while self.progress >= 1.0 {
            if self.index == self.last_index() {
                self.progress = 1.0;
                self.playing = false;
                tracing::debug!(index = self.index, "replay reached final tick");
                return;
            }
            self.index += 1;
            self.progress -= 1.0;
        }
    }
}
