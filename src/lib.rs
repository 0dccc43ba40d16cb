//! Tilt Maze - a tilt-controlled maze game
//!
//! Core modules:
//! - `sim`: Level parsing, gravity simulation, contact resolution, level lifecycle
//! - `platform`: Tilt input sources (accelerometer, pointer fallback, demo)
//! - `renderer`: Presentation collaborators the core reports to
//! - `settings`: JSON configuration

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{AnimationMode, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Level grid pitch. Every map cell is a 64x64 square.
    pub const CELL_SIZE: f32 = 64.0;
    /// Offset from a cell's corner to its center
    pub const CELL_OFFSET: f32 = 32.0;

    /// Where the player (re)spawns in every level
    pub const PLAYER_START: Vec2 = Vec2::new(96.0, 672.0);
    pub const PLAYER_RADIUS: f32 = 22.0;

    /// Contact radii for the permeable entities
    pub const STAR_RADIUS: f32 = 32.0;
    pub const VORTEX_RADIUS: f32 = 32.0;
    pub const FINISH_RADIUS: f32 = 32.0;
    pub const PORTAL_RADIUS: f32 = 24.0;

    /// Velocity fraction lost per second
    pub const LINEAR_DAMPING: f32 = 0.5;

    /// World units (points) per meter of simulated gravity
    pub const POINTS_PER_METER: f32 = 150.0;
    /// m/s² of gravity for one g of device tilt
    pub const TILT_GRAVITY: f32 = 50.0;
    /// Pointer distance (points) per m/s² of gravity on the pointer fallback
    pub const POINTER_GRAVITY_DIVISOR: f32 = 100.0;
    /// Gravity magnitude cap: 1.5 g of tilt, in points/s²
    pub const MAX_GRAVITY: f32 = 1.5 * TILT_GRAVITY * POINTS_PER_METER;
    /// Player speed cap (points/s)
    pub const MAX_SPEED: f32 = 1600.0;
    /// Longest span one physics step integrates; longer frames are clamped
    pub const MAX_STEP_DT: f32 = 0.1;
    /// Upper bound on movement substeps per physics step
    pub const MAX_PHYSICS_SUBSTEPS: u32 = 32;
    /// Wall resolution passes per substep (corners touch two walls)
    pub const WALL_PASSES: u32 = 4;

    /// Vortex death: move onto the vortex, then shrink away
    pub const VORTEX_DEATH_SECS: f32 = 0.5;
    /// Portal transit: fade out, then fade back in at the exit
    pub const PORTAL_TRANSIT_SECS: f32 = 0.6;

    /// Levels bundled with the crate
    pub const TOTAL_LEVELS: u32 = 2;
    pub const START_LEVEL: u32 = 1;
}

/// Center of the grid cell at (column, row), row 0 at the bottom
#[inline]
pub fn cell_center(column: usize, row: usize) -> Vec2 {
    Vec2::new(
        consts::CELL_SIZE * column as f32 + consts::CELL_OFFSET,
        consts::CELL_SIZE * row as f32 + consts::CELL_OFFSET,
    )
}
