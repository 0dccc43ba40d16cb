//! Player integration under tilt gravity
//!
//! One accelerating circle against a static level: damp, accelerate, move in
//! small substeps pushing out of walls, then report every permeable entity
//! the player ends up overlapping.

use glam::Vec2;

use super::collision::{circle_overlaps_shape, circle_rect_collision, reject_into_surface};
use super::registry::{EntityId, EntityKind, EntityRegistry, Shape};
use super::state::{GravityVector, Player};
use crate::consts::*;

/// Player overlaps a non-wall entity this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub entity: EntityId,
    pub kind: EntityKind,
}

/// Outcome of one physics step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Registry order
    pub contacts: Vec<Contact>,
    pub moved: bool,
    /// Any wall pushed the player back this step
    pub hit_wall: bool,
}

/// Integration parameters
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    pub linear_damping: f32,
    pub max_speed: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            linear_damping: LINEAR_DAMPING,
            max_speed: MAX_SPEED,
        }
    }
}

impl PhysicsWorld {
    pub fn new(linear_damping: f32, max_speed: f32) -> Self {
        Self {
            linear_damping,
            max_speed,
        }
    }

    /// Advance the player by `dt` seconds.
    ///
    /// A frozen player does not move, but contacts are still reported.
    /// `dt` is clamped to `MAX_STEP_DT` so a stalled frame cannot carry the
    /// player through a wall.
    pub fn step(
        &self,
        player: &mut Player,
        registry: &EntityRegistry,
        gravity: GravityVector,
        dt: f32,
    ) -> StepReport {
        let mut report = StepReport::default();

        let dt = dt.min(MAX_STEP_DT);
        if !player.frozen && dt > 0.0 {
            let start = player.position;

            let damping = (1.0 - self.linear_damping * dt).max(0.0);
            player.velocity = player.velocity * damping + gravity.vec() * dt;
            player.velocity = player.velocity.clamp_length_max(self.max_speed);

            // Never move more than half a radius before checking walls
            let travel = player.velocity.length() * dt;
            let max_move = (player.radius * 0.5).max(f32::EPSILON);
            let substeps = ((travel / max_move).ceil() as u32).clamp(1, MAX_PHYSICS_SUBSTEPS);
            let sub_dt = dt / substeps as f32;

            for _ in 0..substeps {
                player.position += player.velocity * sub_dt;
                report.hit_wall |= resolve_walls(player, registry);
            }

            report.moved = player.position != start;
        }

        report.contacts = detect_contacts(player, registry);
        report
    }
}

/// Push the player out of every wall it overlaps, dropping the velocity
/// component that drives into each one. Returns true if any wall was hit.
pub fn resolve_walls(player: &mut Player, registry: &EntityRegistry) -> bool {
    let mut hit_any = false;

    for _ in 0..WALL_PASSES {
        let mut hit = false;
        for wall in registry.live().filter(|e| e.solid) {
            let Shape::Rectangle { width, height } = wall.shape else {
                continue;
            };
            let result = circle_rect_collision(
                player.position,
                player.radius,
                wall.position,
                Vec2::new(width, height) / 2.0,
            );
            if result.hit {
                player.position += result.normal * result.penetration;
                player.velocity = reject_into_surface(player.velocity, result.normal);
                hit = true;
            }
        }
        hit_any |= hit;
        if !hit {
            break;
        }
    }

    hit_any
}

/// Every alive, non-solid entity overlapping the player, in registry order
pub fn detect_contacts(player: &Player, registry: &EntityRegistry) -> Vec<Contact> {
    registry
        .live()
        .filter(|e| !e.solid)
        .filter(|e| circle_overlaps_shape(player.position, player.radius, &e.shape, e.position))
        .map(|e| Contact {
            entity: e.id,
            kind: e.kind,
        })
        .collect()
}
