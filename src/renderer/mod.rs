//! Presentation collaborators
//!
//! The simulation never draws anything. It queues `GameEvent`s, and
//! `present` hands them to whatever renderer and HUD the platform provides.

use glam::Vec2;

use crate::sim::{
    AnimationTicket, EntityId, EntityKind, FrozenAnimation, GameEvent, GamePhase, Shape,
};

/// Draws the level and the player
pub trait Renderer {
    fn on_entity_spawned(&mut self, id: EntityId, kind: EntityKind, position: Vec2, shape: Shape);

    fn on_entity_removed(&mut self, id: EntityId);

    fn on_player_moved(&mut self, position: Vec2);

    /// Play a freezing animation. When it finishes the platform must pass
    /// `animation.ticket` to `GameStateMachine::complete_animation` (unless
    /// the simulation runs its own timers).
    fn on_player_frozen_animation(&mut self, animation: &FrozenAnimation);

    /// Everything from the previous level is gone
    fn on_level_unloaded(&mut self) {}
}

pub trait ScoreDisplay {
    fn update(&mut self, score: i64);
}

pub trait PhaseDisplay {
    fn update(&mut self, phase: GamePhase);
}

/// Dispatch simulation events to the presentation collaborators, in order
pub fn present(
    events: impl IntoIterator<Item = GameEvent>,
    renderer: &mut dyn Renderer,
    score: &mut dyn ScoreDisplay,
    phase: &mut dyn PhaseDisplay,
) {
    for event in events {
        match event {
            GameEvent::EntitySpawned {
                id,
                kind,
                position,
                shape,
            } => renderer.on_entity_spawned(id, kind, position, shape),
            GameEvent::EntityRemoved { id } => renderer.on_entity_removed(id),
            GameEvent::LevelUnloaded => renderer.on_level_unloaded(),
            GameEvent::PlayerMoved { position } => renderer.on_player_moved(position),
            GameEvent::PlayerFrozen(animation) => renderer.on_player_frozen_animation(&animation),
            GameEvent::ScoreChanged { score: value } => score.update(value),
            GameEvent::PhaseChanged { phase: value } => phase.update(value),
        }
    }
}

/// Headless renderer: logs what a real renderer would draw and plays
/// animations on a clock
#[derive(Debug, Default)]
pub struct LogRenderer {
    entities: usize,
    player: Vec2,
    /// Animations in flight with their remaining seconds
    playing: Vec<(AnimationTicket, f32)>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_position(&self) -> Vec2 {
        self.player
    }

    /// Entities currently on screen
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    /// Advance animation clocks, returning the tickets that just finished
    pub fn advance(&mut self, dt: f32) -> Vec<AnimationTicket> {
        let mut finished = Vec::new();
        self.playing.retain_mut(|(ticket, remaining)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                finished.push(*ticket);
                false
            } else {
                true
            }
        });
        finished
    }
}

impl Renderer for LogRenderer {
    fn on_entity_spawned(&mut self, id: EntityId, kind: EntityKind, position: Vec2, _shape: Shape) {
        self.entities += 1;
        log::trace!("spawn {:?} {:?} at ({}, {})", id, kind, position.x, position.y);
    }

    fn on_entity_removed(&mut self, id: EntityId) {
        self.entities = self.entities.saturating_sub(1);
        log::debug!("remove {:?}", id);
    }

    fn on_player_moved(&mut self, position: Vec2) {
        self.player = position;
    }

    fn on_player_frozen_animation(&mut self, animation: &FrozenAnimation) {
        log::debug!(
            "{:?} from ({:.0}, {:.0}) to ({:.0}, {:.0}) over {}s",
            animation.kind,
            animation.from.x,
            animation.from.y,
            animation.to.x,
            animation.to.y,
            animation.duration
        );
        self.playing.push((animation.ticket, animation.duration));
    }

    fn on_level_unloaded(&mut self) {
        self.entities = 0;
        self.playing.clear();
    }
}

/// Score line written to the log
#[derive(Debug, Default)]
pub struct LogScore {
    pub score: i64,
}

impl ScoreDisplay for LogScore {
    fn update(&mut self, score: i64) {
        self.score = score;
        log::info!("Score: {}", score);
    }
}

/// Phase banner written to the log
#[derive(Debug, Default)]
pub struct LogPhase {
    pub phase: Option<GamePhase>,
}

impl PhaseDisplay for LogPhase {
    fn update(&mut self, phase: GamePhase) {
        self.phase = Some(phase);
        if phase == GamePhase::LevelComplete {
            log::info!("Level complete! Next level?");
        }
    }
}
