#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic clock that asks the world to walk its monsters.

use std::time::Duration;

use robot_game_core::{Command, Event, RoundStatus};

/// Configuration parameters required to construct the monster clock.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_interval: Duration,
}

impl Config {
    /// Creates a new configuration using the provided step cadence.
    #[must_use]
    pub const fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }
}

/// Pure system that emits [`Command::StepMonsters`] once per elapsed interval.
#[derive(Debug)]
pub struct MonsterClock {
    step_interval: Duration,
    accumulator: Duration,
}

impl MonsterClock {
    /// Creates a new monster clock using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_interval: config.step_interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes events and emits one monster step per full interval elapsed.
    pub fn handle(&mut self, events: &[Event], status: RoundStatus, out: &mut Vec<Command>) {
        if status.is_terminal() {
            self.accumulator = Duration::ZERO;
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_steps() {
            out.push(Command::StepMonsters);
        }
    }

    fn resolve_steps(&mut self) -> usize {
        if self.step_interval.is_zero() {
            return 0;
        }

        let mut steps = 0;
        while self.accumulator >= self.step_interval {
            self.accumulator -= self.step_interval;
            steps += 1;
        }
        steps
    }
}
