#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Robot Game.
//!
//! The world owns the tile map, the coins and monsters, the avatar, the round
//! bookkeeping and the single random number generator. It mutates only inside
//! [`apply`] and reports what happened through [`Event`] values.

mod avatar;
mod entities;
mod layout;
mod tile_map;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_game_core::{
    CellCoord, Command, EntityKind, Event, RoundStatus, DEFAULT_AVATAR_SPEED, DEFAULT_COIN_COUNT,
    DEFAULT_MONSTER_COUNT, DEFAULT_RNG_SEED, DEFAULT_SPAWN,
};

pub use avatar::{Avatar, Intents};
pub use entities::{Entity, EntityRegistry, MonsterMove, PlacedEntity};
pub use layout::{DEFAULT_LAYOUT, DEFAULT_LAYOUT_COLUMNS, DEFAULT_LAYOUT_ROWS};
pub use tile_map::TileMap;

/// Failures raised while building a world.
///
/// Every variant is produced during construction; once a [`World`] exists,
/// [`apply`] never fails.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// The map literal has no rows or no columns.
    #[error("map has no rows or no columns")]
    EmptyMap,
    /// A map row does not match the length of the first row.
    #[error("map row {row} has {found} tiles, expected {expected}")]
    InvalidMapShape {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A map literal contains an identifier other than floor or wall.
    #[error("unknown tile id {value} at column {column}, row {row}")]
    UnknownTile {
        /// Identifier found in the literal.
        value: u8,
        /// Column of the offending tile.
        column: usize,
        /// Row of the offending tile.
        row: usize,
    },
    /// A random map was requested with a wall probability outside `[0, 1]`.
    #[error("wall probability {probability} is not within [0, 1]")]
    InvalidWallProbability {
        /// Requested probability.
        probability: f64,
    },
    /// The avatar spawn cell blocks entry.
    #[error("spawn cell {cell:?} is not walkable")]
    InvalidSpawn {
        /// Requested spawn cell.
        cell: CellCoord,
    },
    /// An explicitly placed entity targets a blocked or occupied cell.
    #[error("cannot place {kind:?} at {cell:?}")]
    InvalidPlacement {
        /// Kind of the rejected entity.
        kind: EntityKind,
        /// Requested cell.
        cell: CellCoord,
    },
    /// Random placement ran out of attempts before finding enough free cells.
    #[error("placed only {placed} of {requested} {kind:?} entities")]
    PlacementExhausted {
        /// Kind being placed.
        kind: EntityKind,
        /// Entities of this kind placed before giving up.
        placed: usize,
        /// Entities of this kind requested.
        requested: usize,
    },
}

/// How coins and monsters are distributed when a round starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Population {
    /// Uniform rejection sampling over free cells, coins first.
    Random {
        /// Number of coins to place.
        coins: usize,
        /// Number of monsters to place.
        monsters: usize,
    },
    /// Fixed cells, validated against the map and each other.
    Explicit {
        /// Coin cells.
        coins: Vec<CellCoord>,
        /// Monster cells.
        monsters: Vec<CellCoord>,
    },
}

impl Default for Population {
    fn default() -> Self {
        Self::Random {
            coins: DEFAULT_COIN_COUNT,
            monsters: DEFAULT_MONSTER_COUNT,
        }
    }
}

/// Parameters used to populate a new world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Cell the avatar starts on.
    pub spawn: CellCoord,
    /// Avatar steps per second while a direction is held.
    pub avatar_speed: u32,
    /// Initial coin and monster layout.
    pub population: Population,
    /// Seed for every random decision made by the world.
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spawn: DEFAULT_SPAWN,
            avatar_speed: DEFAULT_AVATAR_SPEED,
            population: Population::default(),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Score and lifecycle of the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundState {
    score: u32,
    coin_total: u32,
    status: RoundStatus,
}

impl RoundState {
    /// Coins collected so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Coins present when the round started.
    #[must_use]
    pub const fn coin_total(&self) -> u32 {
        self.coin_total
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn status(&self) -> RoundStatus {
        self.status
    }
}

/// Represents the authoritative Robot Game world state.
#[derive(Clone, Debug)]
pub struct World {
    map: TileMap,
    entities: EntityRegistry,
    avatar: Avatar,
    round: RoundState,
    rng: ChaCha8Rng,
    elapsed: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world on the provided map and populates it.
    ///
    /// Random populations draw from the same generator that later drives
    /// monster steps, so a seed fully determines the round.
    pub fn new(map: TileMap, config: Config) -> Result<Self, WorldError> {
        if map.is_collidable(config.spawn) {
            return Err(WorldError::InvalidSpawn { cell: config.spawn });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut entities = EntityRegistry::new();
        entities.reserve(config.spawn);

        match config.population {
            Population::Random { coins, monsters } => {
                let _ = entities.place_random(EntityKind::Coin, coins, &map, &mut rng)?;
                let _ = entities.place_random(EntityKind::Monster, monsters, &map, &mut rng)?;
            }
            Population::Explicit { coins, monsters } => {
                for cell in coins {
                    let _ = entities.insert(EntityKind::Coin, cell, &map)?;
                }
                for cell in monsters {
                    let _ = entities.insert(EntityKind::Monster, cell, &map)?;
                }
            }
        }

        let coin_total = u32::try_from(entities.coin_count()).unwrap_or(u32::MAX);
        let status = if coin_total == 0 {
            RoundStatus::Won
        } else {
            RoundStatus::Playing
        };

        log::info!(
            "populated {}x{} map with {} coins and {} monsters",
            map.columns(),
            map.rows(),
            entities.coin_count(),
            entities.monster_count()
        );

        Ok(Self {
            avatar: Avatar::new(config.spawn, config.avatar_speed),
            map,
            entities,
            round: RoundState {
                score: 0,
                coin_total,
                status,
            },
            rng,
            elapsed: Duration::ZERO,
            tick_index: 0,
        })
    }

    /// Creates a world on the built-in level.
    pub fn with_default_layout(config: Config) -> Result<Self, WorldError> {
        Self::new(TileMap::from_rows(&DEFAULT_LAYOUT)?, config)
    }

    fn collect_coin(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.avatar.cell();
        if !self.entities.remove_coin_at(cell) {
            return;
        }

        self.round.score = self.round.score.saturating_add(1);
        log::debug!(
            "coin collected at {cell:?} ({}/{})",
            self.round.score,
            self.round.coin_total
        );
        out_events.push(Event::CoinCollected {
            cell,
            score: self.round.score,
        });

        if self.round.score >= self.round.coin_total {
            self.end_round(RoundStatus::Won, out_events);
        }
    }

    fn check_monster_contact(&mut self, out_events: &mut Vec<Event>) {
        if self.round.status.is_terminal() {
            return;
        }

        if self.entities.monster_at(self.avatar.cell()).is_some() {
            self.end_round(RoundStatus::Lost, out_events);
        }
    }

    fn end_round(&mut self, status: RoundStatus, out_events: &mut Vec<Event>) {
        self.round.status = status;
        log::info!(
            "round ended {status:?} with {}/{} coins",
            self.round.score,
            self.round.coin_total
        );
        out_events.push(Event::RoundEnded { status });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetIntent { direction, held } => {
            let was_moving = world.avatar.is_moving();
            world.avatar.set_intent(direction, held);
            match (was_moving, world.avatar.is_moving()) {
                (false, true) => out_events.push(Event::MovementStarted),
                (true, false) => out_events.push(Event::MovementStopped),
                _ => {}
            }
        }
        Command::StepAvatar => {
            if world.round.status.is_terminal() {
                return;
            }

            let from = world.avatar.cell();
            if world.avatar.step(&world.map) {
                out_events.push(Event::AvatarMoved {
                    from,
                    to: world.avatar.cell(),
                });
            }
            world.collect_coin(out_events);
            world.check_monster_contact(out_events);
        }
        Command::StepMonsters => {
            if world.round.status.is_terminal() {
                return;
            }

            let moves = world.entities.step_monsters(&world.map, &mut world.rng);
            out_events.extend(moves.into_iter().map(|step| Event::MonsterMoved {
                monster: step.monster,
                from: step.from,
                to: step.to,
            }));
            world.check_monster_contact(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use robot_game_core::{CellCoord, RoundStatus, TileKind};

    use super::{Avatar, EntityRegistry, PlacedEntity, RoundState, TileMap, World};

    /// Provides read-only access to the static tile map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.map
    }

    /// Tile kind at the provided cell, synthesising out-of-bounds tiles.
    #[must_use]
    pub fn kind_at(world: &World, cell: CellCoord) -> TileKind {
        world.map.kind_at(cell)
    }

    /// Provides read-only access to the coins and monsters.
    #[must_use]
    pub fn entities(world: &World) -> &EntityRegistry {
        &world.entities
    }

    /// Coins still on the map in ascending cell order.
    #[must_use]
    pub fn coins(world: &World) -> Vec<PlacedEntity> {
        world.entities.coins().collect()
    }

    /// Monsters in ascending cell order.
    #[must_use]
    pub fn monsters(world: &World) -> Vec<PlacedEntity> {
        world.entities.monsters().collect()
    }

    /// Provides read-only access to the avatar.
    #[must_use]
    pub fn avatar(world: &World) -> &Avatar {
        &world.avatar
    }

    /// Score and lifecycle of the current round.
    #[must_use]
    pub fn round(world: &World) -> RoundState {
        world.round
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn status(world: &World) -> RoundStatus {
        world.round.status
    }

    /// Coins collected so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.round.score
    }

    /// Coins present when the round started.
    #[must_use]
    pub fn coin_total(world: &World) -> u32 {
        world.round.coin_total
    }

    /// Total simulated time accumulated through ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
