#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robot Game engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters translate device input into
//! [`Command`] values, the world executes those commands via its `apply` entry
//! point, and then broadcasts [`Event`] values for systems to react to
//! deterministically. Systems consume event streams and respond exclusively
//! with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Caption shown by adapters that open a window.
pub const GAME_TITLE: &str = "Robot Game";

/// Number of tile columns visible through the camera by default.
pub const DEFAULT_CAMERA_COLUMNS: u32 = 7;

/// Number of tile rows visible through the camera by default.
pub const DEFAULT_CAMERA_ROWS: u32 = 7;

/// Side length of a rendered tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 86;

/// Number of coins scattered across the level at round start.
pub const DEFAULT_COIN_COUNT: usize = 50;

/// Number of monsters roaming the level at round start.
pub const DEFAULT_MONSTER_COUNT: usize = 20;

/// Avatar steps fired per second while a direction is held.
pub const DEFAULT_AVATAR_SPEED: u32 = 4;

/// Simulated time between two monster steps.
pub const DEFAULT_MONSTER_STEP_INTERVAL: Duration = Duration::from_secs(1);

/// Cell the avatar occupies when a round starts.
pub const DEFAULT_SPAWN: CellCoord = CellCoord::new(6, 6);

/// Seed used for placement and monster wandering when none is supplied.
pub const DEFAULT_RNG_SEED: u64 = 0x5eed_c01d_0b07_9a3e;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates one of the avatar's held-direction flags.
    SetIntent {
        /// Direction whose flag changes.
        direction: Direction,
        /// Whether the direction is now held.
        held: bool,
    },
    /// Requests a single avatar step using the currently held directions.
    StepAvatar,
    /// Requests that every monster attempts one random step.
    StepMonsters,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The avatar went from holding no direction to holding at least one.
    MovementStarted,
    /// The avatar released its last held direction.
    MovementStopped,
    /// Confirms that the avatar changed cells during a step.
    AvatarMoved {
        /// Cell the avatar occupied before the step.
        from: CellCoord,
        /// Cell the avatar occupies after the step.
        to: CellCoord,
    },
    /// Confirms that a monster changed cells during a monster step.
    MonsterMoved {
        /// Identifier of the monster that moved.
        monster: EntityId,
        /// Cell the monster occupied before the step.
        from: CellCoord,
        /// Cell the monster occupies after the step.
        to: CellCoord,
    },
    /// Reports that the avatar picked up a coin.
    CoinCollected {
        /// Cell the coin was removed from.
        cell: CellCoord,
        /// Number of coins collected so far, including this one.
        score: u32,
    },
    /// Announces that the round reached a terminal state.
    RoundEnded {
        /// Terminal status the round settled in.
        status: RoundStatus,
    },
}

/// Device-independent input signals consumed by the round controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    /// A direction key went down.
    Press(Direction),
    /// A direction key went up.
    Release(Direction),
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset applied to a cell when moving one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that camera origins and neighbour lookups may
/// reach outside the map; such cells resolve to [`TileKind::OutOfBounds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell displaced by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column.saturating_add(columns),
            row: self.row.saturating_add(rows),
        }
    }

    /// Returns the adjacent cell in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (columns, rows) = direction.offset();
        self.offset(columns, rows)
    }
}

/// Kinds of tiles that compose the static map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Walkable ground.
    Floor,
    /// Solid wall blocking every entity.
    Wall,
    /// Synthesised for coordinates outside the map; never stored.
    OutOfBounds,
}

impl TileKind {
    /// Resolves the numeric identifier used by map literals.
    ///
    /// `0` maps to [`TileKind::Floor`] and `1` to [`TileKind::Wall`].
    #[must_use]
    pub const fn from_layout_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Floor),
            1 => Some(Self::Wall),
            _ => None,
        }
    }

    /// Reports whether the tile blocks entry.
    #[must_use]
    pub const fn is_collidable(self) -> bool {
        match self {
            Self::Floor => false,
            Self::Wall | Self::OutOfBounds => true,
        }
    }

    /// Fixed display color associated with the tile kind.
    #[must_use]
    pub const fn color(self) -> TileColor {
        match self {
            Self::Floor => TileColor::from_rgb(120, 120, 120),
            Self::Wall => TileColor::from_rgb(160, 160, 160),
            Self::OutOfBounds => TileColor::from_rgb(0, 0, 0),
        }
    }
}

/// Opaque RGB color attached to a tile kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Creates a new tile color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to a coin or monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Collections a dynamic entity can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Collectable coin.
    Coin,
    /// Wandering monster.
    Monster,
}

impl EntityKind {
    /// Visual handle used for entities of this kind.
    #[must_use]
    pub const fn sprite(self) -> SpriteKey {
        match self {
            Self::Coin => SpriteKey::Coin,
            Self::Monster => SpriteKey::Monster,
        }
    }
}

/// Opaque visual handle carried by drawable entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Player-controlled robot.
    Robot,
    /// Wandering monster.
    Monster,
    /// Collectable coin.
    Coin,
}

/// Capability shared by everything drawn at a single grid cell.
pub trait Drawable {
    /// Cell currently occupied by the drawable.
    fn cell(&self) -> CellCoord;

    /// Visual handle used when presenting the drawable.
    fn sprite(&self) -> SpriteKey;
}

/// Lifecycle of a single round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundStatus {
    /// The round is in progress.
    #[default]
    Playing,
    /// Every coin was collected.
    Won,
    /// A monster reached the avatar.
    Lost,
}

impl RoundStatus {
    /// Reports whether the round can no longer change state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, RoundStatus, TileKind};

    #[test]
    fn neighbors_follow_screen_axes() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(origin.neighbor(Direction::North), CellCoord::new(3, 2));
        assert_eq!(origin.neighbor(Direction::South), CellCoord::new(3, 4));
        assert_eq!(origin.neighbor(Direction::East), CellCoord::new(4, 3));
        assert_eq!(origin.neighbor(Direction::West), CellCoord::new(2, 3));
    }

    #[test]
    fn out_of_bounds_tiles_are_collidable_and_distinct() {
        assert!(TileKind::OutOfBounds.is_collidable());
        assert!(TileKind::Wall.is_collidable());
        assert!(!TileKind::Floor.is_collidable());
        assert_ne!(TileKind::OutOfBounds.color(), TileKind::Floor.color());
        assert_ne!(TileKind::OutOfBounds.color(), TileKind::Wall.color());
    }

    #[test]
    fn layout_ids_only_cover_stored_kinds() {
        assert_eq!(TileKind::from_layout_id(0), Some(TileKind::Floor));
        assert_eq!(TileKind::from_layout_id(1), Some(TileKind::Wall));
        assert_eq!(TileKind::from_layout_id(2), None);
    }

    #[test]
    fn only_won_and_lost_are_terminal() {
        assert!(!RoundStatus::Playing.is_terminal());
        assert!(RoundStatus::Won.is_terminal());
        assert!(RoundStatus::Lost.is_terminal());
    }

    #[test]
    fn cell_coord_deserializes_from_config_tables() {
        let cell: CellCoord = toml::from_str("column = 6\nrow = -2").expect("valid table");
        assert_eq!(cell, CellCoord::new(6, -2));
    }
}
