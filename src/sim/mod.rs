//! Level simulation
//!
//! All gameplay logic lives here. Single-threaded and deterministic:
//! - Caller-supplied timestep and gravity only
//! - Stable iteration order (registry insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod level;
pub mod physics;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, circle_overlaps_shape, circle_rect_collision};
pub use level::{BundledLevels, DirectoryLevels, LevelError, LevelSource, Placement, parse};
pub use physics::{Contact, PhysicsWorld, StepReport};
pub use registry::{Entity, EntityId, EntityKind, EntityRegistry, Shape};
pub use resolver::{Effect, resolve};
pub use state::{
    AnimationKind, AnimationTicket, FrozenAnimation, GameEvent, GamePhase, GameState,
    GravityVector, PendingEffect, Player,
};
pub use tick::{GameStateMachine, TickInput};
