use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_game_core::{
    CellCoord, TileKind, DEFAULT_AVATAR_SPEED, DEFAULT_CAMERA_COLUMNS, DEFAULT_CAMERA_ROWS,
    DEFAULT_COIN_COUNT, DEFAULT_MONSTER_COUNT, DEFAULT_MONSTER_STEP_INTERVAL, DEFAULT_RNG_SEED,
    DEFAULT_SPAWN, DEFAULT_TILE_SIZE,
};
use robot_game_rendering::Viewport;
use robot_game_system_round::Config as RoundConfig;
use robot_game_world::{Config as WorldConfig, Population, TileMap, DEFAULT_LAYOUT};
use serde::Deserialize;

const DEFAULT_WALL_PROBABILITY: f64 = 0.25;

/// Command-line options for the `robot-game` binary.
///
/// Every option overrides the matching value from the configuration file.
#[derive(Debug, Parser)]
#[command(name = "robot-game")]
#[command(about = "Collect every coin while dodging the monsters")]
pub(crate) struct Args {
    /// TOML file providing defaults for every other option.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Seed for coin placement and monster wandering.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Number of coins scattered at round start.
    #[arg(long)]
    pub(crate) coins: Option<usize>,
    /// Number of monsters placed at round start.
    #[arg(long)]
    pub(crate) monsters: Option<usize>,
    /// Avatar steps per second while a direction is held.
    #[arg(long)]
    pub(crate) speed: Option<u32>,
    /// Whole seconds between two monster steps.
    #[arg(long, value_name = "SECS")]
    pub(crate) monster_interval: Option<u64>,
    /// Generate a random map of the given size instead of the built-in level.
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub(crate) random_map: Option<(u32, u32)>,
    /// Probability that a generated cell becomes a wall.
    #[arg(long)]
    pub(crate) wall_probability: Option<f64>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    pub(crate) vsync: bool,
    /// Log frame rate metrics once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (columns, rows) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid dimension `{part}`: {error}"))
    };
    Ok((parse(columns)?, parse(rows)?))
}

/// Parameters for a generated map.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RandomMap {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    #[serde(default = "default_wall_probability")]
    pub(crate) wall_probability: f64,
}

fn default_wall_probability() -> f64 {
    DEFAULT_WALL_PROBABILITY
}

/// Fully resolved game configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) seed: u64,
    pub(crate) coins: usize,
    pub(crate) monsters: usize,
    pub(crate) speed: u32,
    pub(crate) monster_interval_secs: u64,
    pub(crate) spawn: CellCoord,
    pub(crate) camera_columns: u32,
    pub(crate) camera_rows: u32,
    pub(crate) tile_size: u32,
    pub(crate) map: Option<Vec<Vec<u8>>>,
    pub(crate) random_map: Option<RandomMap>,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_RNG_SEED,
            coins: DEFAULT_COIN_COUNT,
            monsters: DEFAULT_MONSTER_COUNT,
            speed: DEFAULT_AVATAR_SPEED,
            monster_interval_secs: DEFAULT_MONSTER_STEP_INTERVAL.as_secs(),
            spawn: DEFAULT_SPAWN,
            camera_columns: DEFAULT_CAMERA_COLUMNS,
            camera_rows: DEFAULT_CAMERA_ROWS,
            tile_size: DEFAULT_TILE_SIZE,
            map: None,
            random_map: None,
            vsync: false,
            show_fps: false,
        }
    }
}

impl GameConfig {
    /// Loads the configuration file named by the arguments, if any, applies the
    /// command-line overrides and validates the result.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml_str(&contents)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse game configuration toml contents")
    }

    fn apply_overrides(&mut self, args: &Args) {
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(coins) = args.coins {
            self.coins = coins;
        }
        if let Some(monsters) = args.monsters {
            self.monsters = monsters;
        }
        if let Some(speed) = args.speed {
            self.speed = speed;
        }
        if let Some(interval) = args.monster_interval {
            self.monster_interval_secs = interval;
        }
        if let Some((columns, rows)) = args.random_map {
            self.map = None;
            self.random_map = Some(RandomMap {
                columns,
                rows,
                wall_probability: self
                    .random_map
                    .map_or(DEFAULT_WALL_PROBABILITY, |map| map.wall_probability),
            });
        }
        if let Some(probability) = args.wall_probability {
            match self.random_map.as_mut() {
                Some(map) => map.wall_probability = probability,
                None => log::warn!("--wall-probability has no effect without a random map"),
            }
        }
        self.vsync |= args.vsync;
        self.show_fps |= args.show_fps;
    }

    fn validate(&self) -> Result<()> {
        if self.speed == 0 {
            bail!("avatar speed must be at least one step per second");
        }
        if self.monster_interval_secs == 0 {
            bail!("monster interval must be at least one second");
        }
        if self.map.is_some() && self.random_map.is_some() {
            bail!("`map` and `random_map` cannot both be configured");
        }
        Ok(())
    }

    /// Builds the map described by the configuration.
    ///
    /// Generated maps always have a floor tile under the spawn cell.
    pub(crate) fn build_map(&self) -> Result<TileMap> {
        if let Some(rows) = &self.map {
            return TileMap::from_rows(rows).context("invalid map literal");
        }

        if let Some(random) = self.random_map {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
            let mut map =
                TileMap::random(random.columns, random.rows, random.wall_probability, &mut rng)
                    .context("failed to generate random map")?;
            let _ = map.set_kind(self.spawn, TileKind::Floor);
            return Ok(map);
        }

        TileMap::from_rows(&DEFAULT_LAYOUT).context("built-in level is invalid")
    }

    pub(crate) fn round_config(&self) -> RoundConfig {
        RoundConfig {
            world: WorldConfig {
                spawn: self.spawn,
                avatar_speed: self.speed,
                population: Population::Random {
                    coins: self.coins,
                    monsters: self.monsters,
                },
                rng_seed: self.seed,
            },
            monster_step_interval: Duration::from_secs(self.monster_interval_secs),
        }
    }

    pub(crate) fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.camera_columns, self.camera_rows, self.tile_size)
            .context("invalid camera configuration")
    }
}
