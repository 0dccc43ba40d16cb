//! Tilt input sources

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

/// Something that can be polled once per tick for gravity
pub trait InputSource {
    /// Gravity in points/s², or `None` when the source has no reading.
    ///
    /// `player` is the current player position, for pointer-style sources
    /// that pull toward a point.
    fn current_tilt(&mut self, player: Vec2) -> Option<Vec2>;
}

/// Gravity for a device acceleration reading, in g.
///
/// The device is held in landscape, so its y axis tilts the maze
/// horizontally and its x axis vertically.
#[inline]
pub fn gravity_from_acceleration(ax: f32, ay: f32) -> Vec2 {
    Vec2::new(ay * -TILT_GRAVITY, ax * TILT_GRAVITY) * POINTS_PER_METER
}

/// Gravity pulling the player toward a pointer
#[inline]
pub fn gravity_from_pointer(pointer: Vec2, player: Vec2) -> Vec2 {
    (pointer - player) / POINTER_GRAVITY_DIVISOR * POINTS_PER_METER
}

/// Latest accelerometer sample
#[derive(Debug, Clone, Default)]
pub struct Accelerometer {
    latest: Option<(f32, f32)>,
}

impl Accelerometer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample (x, y in g)
    pub fn push_reading(&mut self, ax: f32, ay: f32) {
        self.latest = Some((ax, ay));
    }
}

impl InputSource for Accelerometer {
    fn current_tilt(&mut self, _player: Vec2) -> Option<Vec2> {
        self.latest.map(|(ax, ay)| gravity_from_acceleration(ax, ay))
    }
}

/// Pointer/touch fallback: the player rolls toward the finger
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    touch: Option<Vec2>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_began(&mut self, position: Vec2) {
        self.touch = Some(position);
    }

    pub fn touch_moved(&mut self, position: Vec2) {
        self.touch = Some(position);
    }

    pub fn touch_ended(&mut self) {
        self.touch = None;
    }
}

impl InputSource for PointerInput {
    fn current_tilt(&mut self, player: Vec2) -> Option<Vec2> {
        self.touch.map(|touch| gravity_from_pointer(touch, player))
    }
}

/// Seeded random tilt for headless runs.
///
/// Holds a direction for a while, then swings to a new one.
#[derive(Debug, Clone)]
pub struct WanderingTilt {
    rng: Pcg32,
    direction: Vec2,
    /// Fraction of one g
    strength: f32,
    hold_ticks: u32,
}

impl WanderingTilt {
    pub fn new(seed: u64) -> Self {
        let mut tilt = Self {
            rng: Pcg32::seed_from_u64(seed),
            direction: Vec2::X,
            strength: 0.0,
            hold_ticks: 0,
        };
        tilt.pick();
        tilt
    }

    fn pick(&mut self) {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.direction = Vec2::from_angle(angle);
        self.strength = self.rng.random_range(0.2..1.0);
        self.hold_ticks = self.rng.random_range(30..180);
    }
}

impl InputSource for WanderingTilt {
    fn current_tilt(&mut self, _player: Vec2) -> Option<Vec2> {
        if self.hold_ticks == 0 {
            self.pick();
        }
        self.hold_ticks -= 1;
        Some(self.direction * self.strength * TILT_GRAVITY * POINTS_PER_METER)
    }
}
