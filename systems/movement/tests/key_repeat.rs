use std::time::Duration;

use robot_game_core::{Command, Event};
use robot_game_system_movement::{Config, Movement};

fn tick(ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(ms),
    }
}

fn steps(movement: &mut Movement, events: &[Event]) -> usize {
    let mut out = Vec::new();
    movement.handle(events, &mut out);
    assert!(out.iter().all(|command| *command == Command::StepAvatar));
    out.len()
}

#[test]
fn idle_time_produces_no_steps() {
    let mut movement = Movement::new(Config::from_speed(4));
    assert_eq!(steps(&mut movement, &[tick(5_000)]), 0);
    assert!(!movement.is_armed());
}

#[test]
fn first_step_fires_immediately_on_start() {
    let mut movement = Movement::new(Config::from_speed(4));
    assert_eq!(steps(&mut movement, &[Event::MovementStarted]), 1);
    assert!(movement.is_armed());
}

#[test]
fn time_before_start_in_the_same_batch_is_ignored() {
    let mut movement = Movement::new(Config::from_speed(4));
    assert_eq!(
        steps(&mut movement, &[tick(900), Event::MovementStarted]),
        1
    );
    assert_eq!(steps(&mut movement, &[tick(249)]), 0);
    assert_eq!(steps(&mut movement, &[tick(1)]), 1);
}

#[test]
fn held_direction_repeats_once_per_period() {
    let mut movement = Movement::new(Config::from_speed(4));
    let _ = steps(&mut movement, &[Event::MovementStarted]);

    let mut total = 0;
    for _ in 0..60 {
        total += steps(&mut movement, &[tick(16)]);
    }

    // 960 ms elapsed: three full 250 ms periods.
    assert_eq!(total, 3);
}

#[test]
fn coarse_frames_fire_several_steps() {
    let mut movement = Movement::new(Config::from_speed(4));
    let _ = steps(&mut movement, &[Event::MovementStarted]);

    assert_eq!(steps(&mut movement, &[tick(1_000)]), 4);
}

#[test]
fn stopping_disarms_and_discards_partial_periods() {
    let mut movement = Movement::new(Config::from_speed(4));
    let _ = steps(&mut movement, &[Event::MovementStarted, tick(200)]);

    assert_eq!(steps(&mut movement, &[Event::MovementStopped, tick(500)]), 0);
    assert!(!movement.is_armed());

    assert_eq!(steps(&mut movement, &[Event::MovementStarted, tick(249)]), 1);
}
