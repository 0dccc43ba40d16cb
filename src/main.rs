//! Tilt Maze entry point
//!
//! Headless driver: runs the simulation at a fixed timestep with a seeded
//! wandering tilt, advancing whenever a level is finished, and logs what a
//! renderer would show. Usage: `tilt-maze [settings.json]`

use std::path::PathBuf;
use std::process::ExitCode;

use tilt_maze::consts::SIM_DT;
use tilt_maze::platform::{InputSource, WanderingTilt};
use tilt_maze::renderer::{LogPhase, LogRenderer, LogScore, present};
use tilt_maze::sim::{GamePhase, GameStateMachine, LevelError, TickInput};
use tilt_maze::{AnimationMode, Settings};

fn run(settings: &Settings) -> Result<(), LevelError> {
    let mut machine = GameStateMachine::new(settings, settings.level_source());
    let mut input_source = WanderingTilt::new(settings.demo_seed);
    let mut renderer = LogRenderer::new();
    let mut score = LogScore::default();
    let mut phase = LogPhase::default();

    machine.start()?;

    let mut levels_finished = 0u32;
    for _ in 0..settings.demo_ticks {
        let player = machine
            .player()
            .map(|p| p.position)
            .unwrap_or(tilt_maze::consts::PLAYER_START);
        let finished = machine.phase() == GamePhase::LevelComplete;
        if finished {
            levels_finished += 1;
        }

        let input = TickInput {
            tilt: input_source.current_tilt(player),
            advance: finished,
            restart: false,
        };
        machine.tick(&input, SIM_DT)?;
        present(machine.drain_events(), &mut renderer, &mut score, &mut phase);

        if settings.animation_mode == AnimationMode::External {
            for ticket in renderer.advance(SIM_DT) {
                machine.complete_animation(ticket);
            }
            present(machine.drain_events(), &mut renderer, &mut score, &mut phase);
        }
    }

    log::info!(
        "Ran {} ticks: level {}/{}, score {}, {} level(s) finished, player at ({:.0}, {:.0})",
        settings.demo_ticks,
        machine.state.current_level_index,
        machine.total_levels(),
        score.score,
        levels_finished,
        renderer.player_position().x,
        renderer.player_position().y
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Tilt Maze (headless) starting...");

    let path = std::env::args().nth(1).map(PathBuf::from);
    let settings = match Settings::load_or_default(path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Could not load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "{} level(s), starting at {}, animations: {}",
        settings.total_levels,
        settings.start_level,
        settings.animation_mode.as_str()
    );

    // A broken or missing level ends the session
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}
