#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Robot Game experience.

mod config;
mod scene;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use robot_game_core::GAME_TITLE;
use robot_game_rendering::{Color, Presentation, RenderingBackend, Scene};
use robot_game_rendering_macroquad::MacroquadBackend;
use robot_game_system_round::RoundController;

use self::{
    config::{Args, GameConfig},
    scene::populate_scene,
};

/// Longest frame delta fed into the simulation.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Entry point for the Robot Game command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GameConfig::resolve(&args)?;
    log::info!(
        "seed {:#x}, {} coins, {} monsters, speed {}, monster interval {}s",
        config.seed,
        config.coins,
        config.monsters,
        config.speed,
        config.monster_interval_secs
    );

    let map = config.build_map()?;
    let mut round = RoundController::new(map, config.round_config())
        .context("failed to start the round")?;

    let mut scene = Scene::new(config.viewport()?);
    populate_scene(&round, &mut scene);
    let presentation = Presentation::new(GAME_TITLE, Color::BLACK, scene);

    let backend = MacroquadBackend::new()
        .with_vsync(config.vsync)
        .with_show_fps(config.show_fps);

    backend.run(presentation, move |dt, input, scene| {
        if input.quit_requested {
            log::info!(
                "quit requested with {} / {} coins collected",
                round.score(),
                round.coin_total()
            );
            return false;
        }

        for event in round.tick(cap_frame_delta(dt), &input.inputs) {
            log::trace!("{event:?}");
        }
        populate_scene(&round, scene);
        true
    })
}

/// Clamps stalled frames so a single frame cannot fire a burst of steps.
fn cap_frame_delta(dt: Duration) -> Duration {
    if dt > MAX_FRAME_DELTA {
        log::warn!(
            "frame took {:.1}ms; capping simulation delta to {}ms",
            dt.as_secs_f64() * 1_000.0,
            MAX_FRAME_DELTA.as_millis()
        );
        MAX_FRAME_DELTA
    } else {
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_pass_through() {
        let dt = Duration::from_millis(16);
        assert_eq!(cap_frame_delta(dt), dt);
        assert_eq!(cap_frame_delta(MAX_FRAME_DELTA), MAX_FRAME_DELTA);
    }

    #[test]
    fn stalled_frames_are_capped() {
        assert_eq!(cap_frame_delta(Duration::from_secs(3)), MAX_FRAME_DELTA);
    }
}
