#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Key-repeat system that turns held directions into a cadence of avatar steps.

use std::time::Duration;

use robot_game_core::{Command, Event};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    step_period: Duration,
}

impl Config {
    /// Creates a configuration repeating steps at the provided period.
    #[must_use]
    pub const fn new(step_period: Duration) -> Self {
        Self { step_period }
    }

    /// Creates a configuration firing `speed` steps per second.
    ///
    /// The period is `1000 / speed` whole milliseconds; a speed of zero is
    /// treated as one.
    #[must_use]
    pub fn from_speed(speed: u32) -> Self {
        let speed = u64::from(speed.max(1));
        Self::new(Duration::from_millis(1000 / speed))
    }
}

/// Pure system that reacts to movement transitions and elapsed time by
/// emitting [`Command::StepAvatar`].
///
/// The timer arms when movement starts and fires one step immediately. Every
/// full period of simulated time afterwards fires one more step until movement
/// stops.
#[derive(Debug)]
pub struct Movement {
    step_period: Duration,
    accumulator: Duration,
    armed: bool,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_period: config.step_period,
            accumulator: Duration::ZERO,
            armed: false,
        }
    }

    /// Reports whether the repeat timer is running.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes world events in order and emits avatar step commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::MovementStarted => {
                    self.armed = true;
                    self.accumulator = Duration::ZERO;
                    out.push(Command::StepAvatar);
                }
                Event::MovementStopped => {
                    self.armed = false;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } if self.armed => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    for _ in 0..self.resolve_repeats() {
                        out.push(Command::StepAvatar);
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve_repeats(&mut self) -> usize {
        if self.step_period.is_zero() {
            return 0;
        }

        let mut repeats = 0;
        while self.accumulator >= self.step_period {
            self.accumulator -= self.step_period;
            repeats += 1;
        }
        repeats
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(Config::from_speed(robot_game_core::DEFAULT_AVATAR_SPEED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_never_repeats() {
        let mut movement = Movement::new(Config::new(Duration::ZERO));
        movement.armed = true;
        movement.accumulator = Duration::from_secs(10);
        assert_eq!(movement.resolve_repeats(), 0);
    }

    #[test]
    fn speed_maps_to_whole_millisecond_periods() {
        assert_eq!(Config::from_speed(4).step_period, Duration::from_millis(250));
        assert_eq!(Config::from_speed(3).step_period, Duration::from_millis(333));
        assert_eq!(Config::from_speed(0).step_period, Duration::from_secs(1));
    }
}
