use std::time::Duration;

use robot_game_core::{CellCoord, Direction, Drawable, SpriteKey};

use crate::TileMap;

/// Set of directions the player is currently holding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    north: bool,
    east: bool,
    south: bool,
    west: bool,
}

impl Intents {
    /// Updates the flag for a single direction.
    pub fn set(&mut self, direction: Direction, held: bool) {
        let flag = match direction {
            Direction::North => &mut self.north,
            Direction::East => &mut self.east,
            Direction::South => &mut self.south,
            Direction::West => &mut self.west,
        };
        *flag = held;
    }

    /// Reports whether the direction is held.
    #[must_use]
    pub const fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Reports whether any direction is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.north || self.east || self.south || self.west
    }

    /// Net column and row displacement requested by the held directions.
    ///
    /// Opposite directions cancel out.
    #[must_use]
    pub const fn delta(&self) -> (i32, i32) {
        let dx = self.east as i32 - self.west as i32;
        let dy = self.south as i32 - self.north as i32;
        (dx, dy)
    }
}

/// Player-controlled robot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Avatar {
    cell: CellCoord,
    intents: Intents,
    speed: u32,
}

impl Avatar {
    /// Creates an idle avatar at the provided cell.
    ///
    /// A speed of zero is clamped to one step per second.
    #[must_use]
    pub fn new(cell: CellCoord, speed: u32) -> Self {
        Self {
            cell,
            intents: Intents::default(),
            speed: speed.max(1),
        }
    }

    /// Cell currently occupied by the avatar.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Directions currently held.
    #[must_use]
    pub const fn intents(&self) -> Intents {
        self.intents
    }

    /// Steps fired per second while moving.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Time between two repeated steps while a direction stays held.
    #[must_use]
    pub fn step_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.speed))
    }

    /// Updates a held-direction flag.
    pub fn set_intent(&mut self, direction: Direction, held: bool) {
        self.intents.set(direction, held);
    }

    /// Reports whether any direction is held.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.intents.any()
    }

    /// Performs one step and reports whether the avatar changed cells.
    ///
    /// The horizontal component resolves first. The vertical component is
    /// then tested from the possibly updated column, so a blocked diagonal
    /// degrades into a slide along the wall.
    pub fn step(&mut self, map: &TileMap) -> bool {
        let (dx, dy) = self.intents.delta();
        let start = self.cell;

        let horizontal = self.cell.offset(dx, 0);
        if dx != 0 && !map.is_collidable(horizontal) {
            self.cell = horizontal;
        }

        let vertical = self.cell.offset(0, dy);
        if dy != 0 && !map.is_collidable(vertical) {
            self.cell = vertical;
        }

        self.cell != start
    }
}

impl Drawable for Avatar {
    fn cell(&self) -> CellCoord {
        self.cell
    }

    fn sprite(&self) -> SpriteKey {
        SpriteKey::Robot
    }
}
