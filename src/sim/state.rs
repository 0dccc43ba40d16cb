//! Game state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::{EntityId, EntityKind, Shape};
use crate::consts::*;

/// Level lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level text is being parsed into the registry
    Loading,
    /// Active gameplay
    Playing,
    /// Player reached the finish, waiting for the advance trigger
    LevelComplete,
    /// Tearing down the finished level before loading the next
    Transitioning,
}

/// Score, level and phase. Lives as long as the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// 1-based, wraps to 1 past the last level
    pub current_level_index: u32,
    /// Stars minus vortex deaths; may go negative
    pub score: i64,
    pub phase: GamePhase,
    /// Bumped on every level load; deferred completions from an older
    /// generation are ignored
    pub generation: u64,
}

impl GameState {
    pub fn new(start_level: u32) -> Self {
        Self {
            current_level_index: start_level,
            score: 0,
            phase: GamePhase::Loading,
            generation: 0,
        }
    }

    /// Next level index, wrapping back to 1
    pub fn next_level_index(&self, total_levels: u32) -> u32 {
        if self.current_level_index >= total_levels {
            1
        } else {
            self.current_level_index + 1
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(START_LEVEL)
    }
}

/// The player token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Physics is suspended while an animation plays out
    pub frozen: bool,
}

impl Player {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            frozen: false,
        }
    }

    /// A fresh player at the level start
    pub fn spawn(radius: f32) -> Self {
        Self::new(PLAYER_START, radius)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
        self.velocity = Vec2::ZERO;
    }
}

/// Gravity for one tick, in points/s², magnitude bounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GravityVector(Vec2);

impl GravityVector {
    pub const ZERO: Self = Self(Vec2::ZERO);

    /// Clamp `raw` to `max` magnitude, keeping its direction.
    /// Non-finite input (sensor glitches) counts as no tilt.
    pub fn clamped(raw: Vec2, max: f32) -> Self {
        if !raw.is_finite() {
            return Self::ZERO;
        }
        Self(raw.clamp_length_max(max))
    }

    pub fn vec(self) -> Vec2 {
        self.0
    }
}

/// Animated sequence the player is frozen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationKind {
    /// Slide into the vortex, shrink, despawn; completion respawns
    VortexDeath,
    /// Fade out at the entry portal, fade in at the exit; completion unfreezes
    PortalTransit,
}

/// Handle the presentation layer passes back when an animation finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationTicket {
    pub id: u64,
    /// Level generation the animation was started in
    pub generation: u64,
}

/// Request for the renderer to play a freezing animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrozenAnimation {
    pub ticket: AnimationTicket,
    pub kind: AnimationKind,
    pub from: Vec2,
    pub to: Vec2,
    /// Seconds the animation is expected to take
    pub duration: f32,
}

/// A deferred effect waiting for its animation to complete
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingEffect {
    pub ticket: AnimationTicket,
    pub kind: AnimationKind,
    /// Entity that triggered the sequence
    pub target: EntityId,
    /// Seconds left before a timer-driven completion
    pub remaining: f32,
}

/// Everything the presentation layer needs to hear about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntitySpawned {
        id: EntityId,
        kind: EntityKind,
        position: Vec2,
        shape: Shape,
    },
    EntityRemoved {
        id: EntityId,
    },
    /// All level entities and the player are gone
    LevelUnloaded,
    PlayerMoved {
        position: Vec2,
    },
    PlayerFrozen(FrozenAnimation),
    ScoreChanged {
        score: i64,
    },
    PhaseChanged {
        phase: GamePhase,
    },
}
