use std::time::Duration;

use robot_game_core::{CellCoord, Direction, Event, Input, RoundStatus};
use robot_game_system_round::{Config, RoundController};
use robot_game_world::{query, Config as WorldConfig, Population, TileMap};

const FRAME: Duration = Duration::from_millis(16);

fn room(layout: &[[u8; 5]; 5], coins: &[CellCoord], monsters: &[CellCoord]) -> RoundController {
    let map = TileMap::from_rows(layout).expect("valid room");
    RoundController::new(
        map,
        Config {
            world: WorldConfig {
                spawn: CellCoord::new(2, 2),
                avatar_speed: 4,
                population: Population::Explicit {
                    coins: coins.to_vec(),
                    monsters: monsters.to_vec(),
                },
                rng_seed: 0x00c0_ffee,
            },
            monster_step_interval: Duration::from_secs(1),
        },
    )
    .expect("valid round")
}

const BORDERED: [[u8; 5]; 5] = [
    [1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1],
];

#[test]
fn holding_up_collects_the_coin_above() {
    let mut round = room(
        &BORDERED,
        &[CellCoord::new(2, 1), CellCoord::new(3, 3)],
        &[],
    );

    let events = round.tick(FRAME, &[Input::Press(Direction::North)]);

    assert!(events.contains(&Event::AvatarMoved {
        from: CellCoord::new(2, 2),
        to: CellCoord::new(2, 1),
    }));
    assert!(events.contains(&Event::CoinCollected {
        cell: CellCoord::new(2, 1),
        score: 1,
    }));
    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(2, 1));
    assert!(query::entities(round.world())
        .coin_at(CellCoord::new(2, 1))
        .is_none());
    assert_eq!(round.score(), 1);
    assert_eq!(round.status(), RoundStatus::Playing);
}

#[test]
fn holding_against_a_wall_keeps_the_avatar_in_place() {
    let mut round = room(&BORDERED, &[CellCoord::new(3, 3)], &[]);

    let _ = round.tick(FRAME, &[Input::Press(Direction::North)]);
    for _ in 0..120 {
        let _ = round.tick(FRAME, &[]);
    }

    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(2, 1));
}

#[test]
fn monster_walking_onto_the_avatar_loses_the_round() {
    let layout = [
        [1, 1, 1, 1, 1],
        [1, 1, 0, 1, 1],
        [1, 0, 0, 0, 1],
        [1, 0, 0, 0, 1],
        [1, 1, 1, 1, 1],
    ];
    let mut round = room(&layout, &[CellCoord::new(3, 3)], &[CellCoord::new(2, 1)]);

    let mut last_events = Vec::new();
    for _ in 0..200 {
        last_events = round.tick(Duration::from_secs(1), &[]);
        if round.status() != RoundStatus::Playing {
            break;
        }
    }

    assert_eq!(round.status(), RoundStatus::Lost);
    assert_eq!(round.status_text(), "Game Over");
    let ending = &last_events[last_events.len() - 2..];
    assert!(matches!(
        ending[0],
        Event::MonsterMoved { from, to, .. }
            if from == CellCoord::new(2, 1) && to == CellCoord::new(2, 2)
    ));
    assert_eq!(
        ending[1],
        Event::RoundEnded {
            status: RoundStatus::Lost,
        }
    );
}

#[test]
fn avatar_walking_onto_a_monster_loses_the_round() {
    let layout = [
        [1, 1, 1, 1, 1],
        [1, 1, 0, 1, 1],
        [1, 1, 0, 1, 1],
        [1, 0, 0, 0, 1],
        [1, 1, 1, 1, 1],
    ];
    let mut round = room(&layout, &[CellCoord::new(3, 3)], &[CellCoord::new(2, 1)]);

    let events = round.tick(FRAME, &[Input::Press(Direction::North)]);

    assert_eq!(round.status(), RoundStatus::Lost);
    assert_eq!(
        events.last(),
        Some(&Event::RoundEnded {
            status: RoundStatus::Lost,
        })
    );
}

#[test]
fn collecting_the_only_coin_wins_for_good() {
    let mut round = room(&BORDERED, &[CellCoord::new(2, 1)], &[CellCoord::new(3, 3)]);

    let _ = round.tick(FRAME, &[Input::Press(Direction::North)]);
    assert_eq!(round.status(), RoundStatus::Won);
    assert_eq!(round.status_text(), "You Win!");

    let monsters_before = query::entities(round.world()).monster_positions();
    for _ in 0..10 {
        let events = round.tick(
            Duration::from_secs(1),
            &[Input::Release(Direction::North), Input::Press(Direction::South)],
        );
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::AvatarMoved { .. } | Event::MonsterMoved { .. })));
        assert_eq!(round.status(), RoundStatus::Won);
    }

    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(2, 1));
    assert_eq!(
        query::entities(round.world()).monster_positions(),
        monsters_before
    );
}

#[test]
fn one_coarse_frame_fires_several_avatar_steps() {
    let map = TileMap::from_rows(&BORDERED).expect("valid room");
    let mut round = RoundController::new(
        map,
        Config {
            world: WorldConfig {
                spawn: CellCoord::new(1, 3),
                avatar_speed: 4,
                population: Population::Explicit {
                    coins: vec![CellCoord::new(3, 3)],
                    monsters: Vec::new(),
                },
                rng_seed: 0,
            },
            monster_step_interval: Duration::from_secs(1),
        },
    )
    .expect("valid round");

    // The immediate step reaches (1, 2); 500 ms later two repeats have fired.
    let _ = round.tick(Duration::ZERO, &[Input::Press(Direction::North)]);
    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(1, 2));

    let events = round.tick(Duration::from_millis(500), &[]);
    let moves = events
        .iter()
        .filter(|event| matches!(event, Event::AvatarMoved { .. }))
        .count();
    assert_eq!(moves, 1, "second repeat is blocked by the border");
    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(1, 1));
}

#[test]
fn press_and_release_within_one_frame_still_steps() {
    let mut round = room(&BORDERED, &[CellCoord::new(3, 3)], &[]);

    let _ = round.tick(
        Duration::ZERO,
        &[
            Input::Press(Direction::East),
            Input::Release(Direction::East),
        ],
    );

    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(3, 2));
    assert!(!round.is_avatar_timer_armed());
}

#[test]
fn second_press_in_a_frame_does_not_join_the_first_step() {
    let mut round = room(&BORDERED, &[CellCoord::new(3, 3)], &[]);

    let _ = round.tick(
        Duration::ZERO,
        &[Input::Press(Direction::North), Input::Press(Direction::East)],
    );

    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(2, 1));
    assert!(round.is_avatar_timer_armed());
}

#[test]
fn switching_direction_within_one_frame_steps_immediately() {
    let mut round = room(&BORDERED, &[CellCoord::new(1, 3)], &[]);

    let _ = round.tick(Duration::ZERO, &[Input::Press(Direction::North)]);
    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(2, 1));

    let _ = round.tick(Duration::from_millis(200), &[]);
    let events = round.tick(
        FRAME,
        &[
            Input::Release(Direction::North),
            Input::Press(Direction::East),
        ],
    );

    assert!(events.contains(&Event::AvatarMoved {
        from: CellCoord::new(2, 1),
        to: CellCoord::new(3, 1),
    }));
    assert_eq!(query::avatar(round.world()).cell(), CellCoord::new(3, 1));
    assert!(round.is_avatar_timer_armed());
}
