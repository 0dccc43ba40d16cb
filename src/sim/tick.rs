//! Level lifecycle and the per-tick simulation step
//!
//! ```text
//! Loading -> Playing -> LevelComplete -> Transitioning -> Loading -> Playing ...
//! ```
//!
//! Vortex deaths and portal transits freeze the player until their animation
//! completes. Each deferred completion carries a ticket tagged with the level
//! generation; reloading a level bumps the generation and drops every pending
//! effect, so a late completion can never touch the new level.

use glam::Vec2;

use super::level::{self, LevelError, LevelSource};
use super::physics::PhysicsWorld;
use super::registry::{EntityId, EntityRegistry};
use super::resolver::{self, Effect};
use super::state::{
    AnimationKind, AnimationTicket, FrozenAnimation, GameEvent, GamePhase, GameState,
    GravityVector, PendingEffect, Player,
};
use crate::consts::*;
use crate::settings::{AnimationMode, Settings};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Gravity from the input source, `None` when no source is available
    pub tilt: Option<Vec2>,
    /// Move on to the next level (only honored after the finish)
    pub advance: bool,
    /// Reload the current level
    pub restart: bool,
}

/// Owns the active level and drives it through its phases
pub struct GameStateMachine {
    pub state: GameState,
    registry: EntityRegistry,
    player: Option<Player>,
    physics: PhysicsWorld,
    pending: Vec<PendingEffect>,
    next_ticket: u64,
    levels: Box<dyn LevelSource>,
    total_levels: u32,
    player_radius: f32,
    max_gravity: f32,
    animation_mode: AnimationMode,
    events: Vec<GameEvent>,
}

impl GameStateMachine {
    pub fn new(settings: &Settings, levels: Box<dyn LevelSource>) -> Self {
        Self {
            state: GameState::new(settings.start_level),
            registry: EntityRegistry::new(),
            player: None,
            physics: PhysicsWorld::new(settings.linear_damping, settings.max_speed),
            pending: Vec::new(),
            next_ticket: 0,
            levels,
            total_levels: settings.total_levels,
            player_radius: settings.player_radius,
            max_gravity: settings.max_gravity,
            animation_mode: settings.animation_mode,
            events: Vec::new(),
        }
    }

    /// Load the starting level
    pub fn start(&mut self) -> Result<(), LevelError> {
        self.load_level(self.state.current_level_index)
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    /// Deferred effects still waiting on an animation
    pub fn pending(&self) -> &[PendingEffect] {
        &self.pending
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the game by one timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Result<(), LevelError> {
        if input.restart {
            self.restart_level()?;
        }
        if input.advance && self.state.phase == GamePhase::LevelComplete {
            self.advance()?;
        }

        if self.animation_mode == AnimationMode::Timer {
            self.run_timers(dt);
        }

        if self.state.phase != GamePhase::Playing {
            return Ok(());
        }

        let gravity = input
            .tilt
            .map(|tilt| GravityVector::clamped(tilt, self.max_gravity))
            .unwrap_or(GravityVector::ZERO);

        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };

        let report = self.physics.step(player, &self.registry, gravity, dt);
        if report.moved {
            self.events.push(GameEvent::PlayerMoved {
                position: player.position,
            });
        }

        let effects =
            resolver::resolve_all(&report.contacts, &mut self.state, &mut self.registry, player);
        for effect in effects {
            self.apply(effect);
        }

        Ok(())
    }

    /// Move from a completed level to the next one, wrapping after the last
    pub fn advance(&mut self) -> Result<(), LevelError> {
        if self.state.phase != GamePhase::LevelComplete {
            log::debug!("Ignoring advance in {:?}", self.state.phase);
            return Ok(());
        }

        self.set_phase(GamePhase::Transitioning);
        let next = self.state.next_level_index(self.total_levels);
        log::info!(
            "Level {} complete, advancing to {}",
            self.state.current_level_index,
            next
        );
        self.state.current_level_index = next;
        self.load_level(next)
    }

    /// Reload the current level; score is kept
    pub fn restart_level(&mut self) -> Result<(), LevelError> {
        log::info!("Restarting level {}", self.state.current_level_index);
        self.load_level(self.state.current_level_index)
    }

    /// Report that the animation behind `ticket` has finished.
    ///
    /// Returns false for stale or unknown tickets, which are ignored.
    pub fn complete_animation(&mut self, ticket: AnimationTicket) -> bool {
        if ticket.generation != self.state.generation {
            log::debug!(
                "Ignoring stale animation {} from generation {}",
                ticket.id,
                ticket.generation
            );
            return false;
        }
        let Some(idx) = self.pending.iter().position(|p| p.ticket == ticket) else {
            log::debug!("Ignoring unknown animation {}", ticket.id);
            return false;
        };
        let effect = self.pending.remove(idx);
        self.finish_effect(effect);
        true
    }

    /// Clear the level, parse the new one and spawn the player.
    ///
    /// On error nothing of the new level is kept and the phase stays Loading.
    fn load_level(&mut self, index: u32) -> Result<(), LevelError> {
        if index == 0 || index > self.total_levels {
            return Err(LevelError::InvalidIndex {
                index,
                total: self.total_levels,
            });
        }

        self.unload_level();
        self.set_phase(GamePhase::Loading);

        let text = self.levels.level_text(index)?;
        let count = level::build(&text, &mut self.registry)?;
        log::info!("Loaded level {} ({} entities)", index, count);

        for entity in self.registry.iter() {
            self.events.push(GameEvent::EntitySpawned {
                id: entity.id,
                kind: entity.kind,
                position: entity.position,
                shape: entity.shape,
            });
        }
        self.spawn_player();
        self.set_phase(GamePhase::Playing);
        Ok(())
    }

    fn unload_level(&mut self) {
        // Anything still animating belongs to the old level
        self.state.generation += 1;
        self.pending.clear();
        self.registry.clear();
        self.player = None;
        self.events.push(GameEvent::LevelUnloaded);
    }

    fn spawn_player(&mut self) {
        let player = Player::spawn(self.player_radius);
        self.events.push(GameEvent::PlayerMoved {
            position: player.position,
        });
        self.player = Some(player);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.state.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
        }
        // Always announce; a reload passes through the same phases again
        self.events.push(GameEvent::PhaseChanged { phase });
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StarCollected { star } => {
                self.events.push(GameEvent::EntityRemoved { id: star });
                self.push_score();
            }
            Effect::VortexEntered { vortex, from, to } => {
                self.push_score();
                self.defer(AnimationKind::VortexDeath, vortex, from, to, VORTEX_DEATH_SECS);
            }
            Effect::LevelFinished { .. } => {
                log::info!("Level {} finished", self.state.current_level_index);
                self.events.push(GameEvent::PhaseChanged {
                    phase: GamePhase::LevelComplete,
                });
            }
            Effect::Teleported {
                entry,
                exit,
                from,
                to,
            } => {
                self.events.push(GameEvent::EntityRemoved { id: entry });
                self.events.push(GameEvent::EntityRemoved { id: exit });
                self.events.push(GameEvent::PlayerMoved { position: to });
                self.defer(AnimationKind::PortalTransit, entry, from, to, PORTAL_TRANSIT_SECS);
            }
            Effect::PortalUnpaired { .. } => {}
        }
    }

    fn push_score(&mut self) {
        self.events.push(GameEvent::ScoreChanged {
            score: self.state.score,
        });
    }

    fn defer(
        &mut self,
        kind: AnimationKind,
        target: EntityId,
        from: Vec2,
        to: Vec2,
        duration: f32,
    ) {
        let ticket = AnimationTicket {
            id: self.next_ticket,
            generation: self.state.generation,
        };
        self.next_ticket += 1;

        self.pending.push(PendingEffect {
            ticket,
            kind,
            target,
            remaining: duration,
        });
        self.events.push(GameEvent::PlayerFrozen(FrozenAnimation {
            ticket,
            kind,
            from,
            to,
            duration,
        }));
    }

    /// Count down pending effects and complete the expired ones in order
    fn run_timers(&mut self, dt: f32) {
        if self.pending.is_empty() {
            return;
        }
        for effect in &mut self.pending {
            effect.remaining -= dt;
        }
        let (done, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|effect| effect.remaining <= 0.0);
        self.pending = waiting;
        for effect in done {
            self.finish_effect(effect);
        }
    }

    fn finish_effect(&mut self, effect: PendingEffect) {
        match effect.kind {
            AnimationKind::VortexDeath => {
                log::debug!("Death sequence done, respawning");
                self.spawn_player();
            }
            AnimationKind::PortalTransit => {
                if let Some(player) = self.player.as_mut() {
                    player.frozen = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::registry::EntityKind;

    /// Level texts kept in memory
    struct FixedLevels(Vec<String>);

    impl LevelSource for FixedLevels {
        fn level_text(&self, index: u32) -> Result<String, LevelError> {
            index
                .checked_sub(1)
                .and_then(|i| self.0.get(i as usize))
                .cloned()
                .ok_or_else(|| LevelError::MissingResource {
                    name: level::level_name(index),
                })
        }
    }

    /// 12-row map with the player start at column 1 of the second line
    fn map(second_line: &str) -> String {
        let mut lines = vec!["xxxxxxxxxxxxxxxx", second_line];
        lines.extend(std::iter::repeat_n("x              x", 9));
        lines.push("xxxxxxxxxxxxxxxx");
        lines.join("\n")
    }

    fn machine_with(levels: Vec<String>, mode: AnimationMode) -> GameStateMachine {
        let settings = Settings {
            total_levels: levels.len() as u32,
            animation_mode: mode,
            ..Settings::default()
        };
        let mut machine = GameStateMachine::new(&settings, Box::new(FixedLevels(levels)));
        machine.start().unwrap();
        machine
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_start_loads_level_and_player() {
        let mut machine = machine_with(vec![map("x   s          x")], AnimationMode::Timer);
        assert_eq!(machine.phase(), GamePhase::Playing);
        assert_eq!(machine.player().unwrap().position, PLAYER_START);
        assert_eq!(machine.registry().count_alive(EntityKind::Star), 1);

        let events = machine.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged {
            phase: GamePhase::Playing
        }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::EntitySpawned { kind: EntityKind::Star, .. }))
        );
    }

    #[test]
    fn test_star_under_player_is_collected() {
        let mut machine = machine_with(vec![map("xs             x")], AnimationMode::Timer);
        machine.tick(&idle(), SIM_DT).unwrap();
        assert_eq!(machine.state.score, 1);
        assert_eq!(machine.registry().count_alive(EntityKind::Star), 0);

        machine.tick(&idle(), SIM_DT).unwrap();
        assert_eq!(machine.state.score, 1);
    }

    #[test]
    fn test_vortex_death_then_respawn() {
        let mut machine = machine_with(vec![map("x   v          x")], AnimationMode::External);
        // Roll right into the vortex
        let input = TickInput {
            tilt: Some(Vec2::new(MAX_GRAVITY, 0.0)),
            ..Default::default()
        };
        let mut ticks = 0;
        while !machine.player().unwrap().frozen {
            machine.tick(&input, SIM_DT).unwrap();
            ticks += 1;
            assert!(ticks < 600, "never reached the vortex");
        }
        assert_eq!(machine.state.score, -1);

        let events = machine.drain_events();
        let animation = events
            .iter()
            .find_map(|e| match e {
                GameEvent::PlayerFrozen(a) => Some(*a),
                _ => None,
            })
            .unwrap();
        assert_eq!(animation.kind, AnimationKind::VortexDeath);
        assert_eq!(animation.to, crate::cell_center(4, 10));

        // Frozen: ticking does not move or re-trigger
        let before = machine.player().unwrap().position;
        machine.tick(&input, SIM_DT).unwrap();
        assert_eq!(machine.player().unwrap().position, before);
        assert_eq!(machine.state.score, -1);

        assert!(machine.complete_animation(animation.ticket));
        let player = machine.player().unwrap();
        assert!(!player.frozen);
        assert_eq!(player.position, Vec2::new(96.0, 672.0));
        assert_eq!(machine.phase(), GamePhase::Playing);

        // Completing twice does nothing
        assert!(!machine.complete_animation(animation.ticket));
    }

    #[test]
    fn test_timer_mode_completes_death() {
        let mut machine = machine_with(vec![map("xv             x")], AnimationMode::Timer);
        machine.tick(&idle(), SIM_DT).unwrap();
        assert!(machine.player().unwrap().frozen);
        assert_eq!(machine.pending().len(), 1);

        assert_eq!(machine.state.score, -1);

        // The respawned player lands on the vortex again and dies once more
        let ticks = (VORTEX_DEATH_SECS / SIM_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            machine.tick(&idle(), SIM_DT).unwrap();
        }
        assert_eq!(machine.state.score, -2);
        assert_eq!(machine.pending().len(), 1);
        let player = machine.player().unwrap();
        assert!(player.frozen);
        assert_eq!(player.position, PLAYER_START);
    }

    #[test]
    fn test_portal_pair_single_use() {
        let mut machine = machine_with(vec![map("xp           p x")], AnimationMode::External);
        machine.tick(&idle(), SIM_DT).unwrap();

        let player = machine.player().unwrap();
        assert!(player.frozen);
        assert_eq!(player.position, crate::cell_center(13, 10));
        assert_eq!(machine.registry().count_alive(EntityKind::Portal), 0);

        let ticket = machine.pending()[0].ticket;
        assert!(machine.complete_animation(ticket));
        assert!(!machine.player().unwrap().frozen);

        // No portals left to re-trigger
        machine.tick(&idle(), SIM_DT).unwrap();
        assert_eq!(machine.player().unwrap().position, crate::cell_center(13, 10));
    }

    #[test]
    fn test_unpaired_portal_leaves_player_free() {
        let mut machine = machine_with(vec![map("xp             x")], AnimationMode::External);
        machine.tick(&idle(), SIM_DT).unwrap();

        let player = machine.player().unwrap();
        assert!(!player.frozen);
        assert_eq!(player.position, PLAYER_START);
        assert!(machine.pending().is_empty());
        assert_eq!(machine.registry().count_alive(EntityKind::Portal), 1);
    }

    #[test]
    fn test_finish_then_advance_wraps() {
        let mut machine = machine_with(
            vec![map("xf             x"), map("xf             x")],
            AnimationMode::Timer,
        );
        assert_eq!(machine.state.current_level_index, 1);

        machine.tick(&idle(), SIM_DT).unwrap();
        assert_eq!(machine.phase(), GamePhase::LevelComplete);
        assert!(machine.player().unwrap().frozen);

        machine
            .tick(
                &TickInput {
                    advance: true,
                    ..Default::default()
                },
                SIM_DT,
            )
            .unwrap();
        assert_eq!(machine.state.current_level_index, 2);

        // Finish again on level 2, then wrap back to level 1
        machine.tick(&idle(), SIM_DT).unwrap();
        assert_eq!(machine.phase(), GamePhase::LevelComplete);
        machine.advance().unwrap();
        assert_eq!(machine.state.current_level_index, 1);
        assert_eq!(machine.phase(), GamePhase::Playing);
        assert!(!machine.player().unwrap().frozen);
    }

    #[test]
    fn test_advance_ignored_while_playing() {
        let mut machine = machine_with(vec![map("x              x"), map("x   f          x")], AnimationMode::Timer);
        machine.advance().unwrap();
        assert_eq!(machine.state.current_level_index, 1);
        assert_eq!(machine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_stale_completion_after_restart() {
        let mut machine = machine_with(vec![map("xv             x")], AnimationMode::External);
        machine.tick(&idle(), SIM_DT).unwrap();
        let ticket = machine.pending()[0].ticket;

        machine.restart_level().unwrap();
        assert!(machine.pending().is_empty());
        let fresh = machine.player().unwrap().clone();

        assert!(!machine.complete_animation(ticket));
        assert_eq!(machine.player().unwrap(), &fresh);
        // Score survives a restart
        assert_eq!(machine.state.score, -1);
    }

    #[test]
    fn test_malformed_level_is_fatal() {
        let settings = Settings {
            total_levels: 2,
            ..Settings::default()
        };
        let levels = FixedLevels(vec!["x  \n s ".to_string(), "x?x".to_string()]);
        let mut machine = GameStateMachine::new(&settings, Box::new(levels));
        machine.start().unwrap();

        machine.state.phase = GamePhase::LevelComplete;
        let err = machine.advance().unwrap_err();
        assert!(matches!(err, LevelError::Malformed { letter: '?', .. }));
        assert_eq!(machine.phase(), GamePhase::Loading);
        assert!(machine.registry().is_empty());
        assert!(machine.player().is_none());
    }

    #[test]
    fn test_missing_level_is_fatal() {
        let settings = Settings {
            total_levels: 3,
            start_level: 3,
            ..Settings::default()
        };
        let mut machine = GameStateMachine::new(&settings, Box::new(FixedLevels(vec!["x".to_string()])));
        assert!(matches!(
            machine.start(),
            Err(LevelError::MissingResource { .. })
        ));
    }

    #[test]
    fn test_no_input_means_no_gravity() {
        let mut machine = machine_with(vec![map("x              x")], AnimationMode::Timer);
        for _ in 0..30 {
            machine.tick(&idle(), SIM_DT).unwrap();
        }
        assert_eq!(machine.player().unwrap().position, PLAYER_START);
    }
}
