#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick orchestration of a single Robot Game round.
//!
//! [`RoundController`] owns the authoritative world together with the pure
//! systems that drive it. Each tick submits the elapsed time and the frame's
//! inputs as commands, then routes the resulting events through the systems
//! until no further commands are produced.

use std::time::Duration;

use robot_game_core::{Command, Event, Input, RoundStatus, DEFAULT_MONSTER_STEP_INTERVAL};
use robot_game_system_monsters::{self as monsters, MonsterClock};
use robot_game_system_movement::{self as movement, Movement};
use robot_game_world::{self as world, query, TileMap, World, WorldError};

/// Parameters used to start a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Population, spawn, speed and seed handed to the world.
    pub world: world::Config,
    /// Simulated time between two monster steps.
    pub monster_step_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: world::Config::default(),
            monster_step_interval: DEFAULT_MONSTER_STEP_INTERVAL,
        }
    }
}

/// Drives the world and its systems for one round.
#[derive(Debug)]
pub struct RoundController {
    world: World,
    movement: Movement,
    monsters: MonsterClock,
}

impl RoundController {
    /// Starts a round on the provided map.
    pub fn new(map: TileMap, config: Config) -> Result<Self, WorldError> {
        let world = World::new(map, config.world)?;
        Ok(Self::from_world(world, config.monster_step_interval))
    }

    /// Wraps an already populated world.
    #[must_use]
    pub fn from_world(world: World, monster_step_interval: Duration) -> Self {
        let step_period = query::avatar(&world).step_period();
        Self {
            world,
            movement: Movement::new(movement::Config::new(step_period)),
            monsters: MonsterClock::new(monsters::Config::new(monster_step_interval)),
        }
    }

    /// Advances the round by `dt` after applying the frame's inputs.
    ///
    /// Time is submitted before the inputs, so a direction pressed during this
    /// frame fires its immediate step without also consuming the frame's time
    /// towards a repeat. Inputs are applied in order and each one runs through
    /// the systems before the next. Returns every event the world emitted, in
    /// order.
    pub fn tick(&mut self, dt: Duration, inputs: &[Input]) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.process_systems(events, &mut log);

        for input in inputs {
            let (direction, held) = match *input {
                Input::Press(direction) => (direction, true),
                Input::Release(direction) => (direction, false),
            };
            let mut events = Vec::new();
            world::apply(
                &mut self.world,
                Command::SetIntent { direction, held },
                &mut events,
            );
            self.process_systems(events, &mut log);
        }

        log
    }

    fn process_systems(&mut self, pending_events: Vec<Event>, log: &mut Vec<Event>) {
        let mut events = pending_events;

        loop {
            if events.is_empty() {
                break;
            }
            log.extend(events.iter().cloned());

            let mut commands = Vec::new();
            self.movement.handle(&events, &mut commands);
            self.monsters
                .handle(&events, query::status(&self.world), &mut commands);

            if commands.is_empty() {
                break;
            }

            let status = query::status(&self.world);
            if status.is_terminal() {
                log::debug!(
                    "round is {status:?}; {} step commands have no effect",
                    commands.len()
                );
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn status(&self) -> RoundStatus {
        query::status(&self.world)
    }

    /// Coins collected so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Coins present when the round started.
    #[must_use]
    pub fn coin_total(&self) -> u32 {
        query::coin_total(&self.world)
    }

    /// Reports whether the avatar's repeat timer is running.
    #[must_use]
    pub fn is_avatar_timer_armed(&self) -> bool {
        self.movement.is_armed()
    }

    /// Status line shown to the player.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self.status() {
            RoundStatus::Playing => {
                format!("Coins collected: {} / {}", self.score(), self.coin_total())
            }
            RoundStatus::Won => String::from("You Win!"),
            RoundStatus::Lost => String::from("Game Over"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_game_core::{CellCoord, Direction};
    use robot_game_world::Population;

    fn controller(coins: Vec<CellCoord>) -> RoundController {
        let map = TileMap::from_rows(&[[1u8, 1, 1, 1], [1, 0, 0, 1], [1, 0, 0, 1], [1, 1, 1, 1]])
            .expect("valid room");
        RoundController::new(
            map,
            Config {
                world: world::Config {
                    spawn: CellCoord::new(1, 1),
                    avatar_speed: 4,
                    population: Population::Explicit {
                        coins,
                        monsters: Vec::new(),
                    },
                    rng_seed: 0,
                },
                monster_step_interval: Duration::from_secs(1),
            },
        )
        .expect("valid round")
    }

    #[test]
    fn status_text_tracks_progress() {
        let mut round = controller(vec![CellCoord::new(2, 1), CellCoord::new(2, 2)]);
        assert_eq!(round.status_text(), "Coins collected: 0 / 2");

        let _ = round.tick(Duration::ZERO, &[Input::Press(Direction::East)]);
        assert_eq!(round.status_text(), "Coins collected: 1 / 2");

        let _ = round.tick(
            Duration::ZERO,
            &[
                Input::Release(Direction::East),
                Input::Press(Direction::South),
            ],
        );
        assert_eq!(round.status(), RoundStatus::Won);
        assert_eq!(round.status_text(), "You Win!");
    }

    #[test]
    fn releasing_every_direction_disarms_the_timer() {
        let mut round = controller(vec![CellCoord::new(2, 2)]);

        let _ = round.tick(Duration::ZERO, &[Input::Press(Direction::North)]);
        assert!(round.is_avatar_timer_armed());

        let _ = round.tick(Duration::ZERO, &[Input::Release(Direction::North)]);
        assert!(!round.is_avatar_timer_armed());
    }
}
