use std::time::Duration;

use robot_game_core::{CellCoord, Direction, Event, Input, RoundStatus};
use robot_game_system_round::{Config, RoundController};
use robot_game_world::{query, Config as WorldConfig, TileMap, DEFAULT_LAYOUT};

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(0x1234_5678);
    let second = replay(0x1234_5678);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first.events.len() >= 600, "every frame advances time");
}

#[test]
fn different_seeds_diverge() {
    assert_ne!(replay(1).monsters, replay(2).monsters);
}

fn replay(seed: u64) -> ReplayOutcome {
    let map = TileMap::from_rows(&DEFAULT_LAYOUT).expect("built-in level is valid");
    let mut round = RoundController::new(
        map,
        Config {
            world: WorldConfig {
                rng_seed: seed,
                ..WorldConfig::default()
            },
            ..Config::default()
        },
    )
    .expect("built-in level fits the default population");

    let mut events = Vec::new();
    for (frame, inputs) in scripted_inputs().into_iter().enumerate() {
        let dt = if frame % 7 == 0 {
            Duration::from_millis(40)
        } else {
            Duration::from_millis(16)
        };
        events.extend(round.tick(dt, &inputs));
    }

    ReplayOutcome {
        avatar: query::avatar(round.world()).cell(),
        coins: query::entities(round.world()).coin_positions(),
        monsters: query::entities(round.world()).monster_positions(),
        score: round.score(),
        status: round.status(),
        events,
    }
}

fn scripted_inputs() -> Vec<Vec<Input>> {
    let mut frames = vec![Vec::new(); 600];
    let script = [
        (10, Input::Press(Direction::East)),
        (80, Input::Press(Direction::South)),
        (120, Input::Release(Direction::East)),
        (200, Input::Release(Direction::South)),
        (260, Input::Press(Direction::West)),
        (400, Input::Release(Direction::West)),
        (420, Input::Press(Direction::North)),
        (560, Input::Release(Direction::North)),
    ];
    for (frame, input) in script {
        frames[frame].push(input);
    }
    frames
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayOutcome {
    avatar: CellCoord,
    coins: Vec<CellCoord>,
    monsters: Vec<CellCoord>,
    score: u32,
    status: RoundStatus,
    events: Vec<Event>,
}
