#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Robot Game adapters.

use anyhow::Result as AnyResult;
use glam::{IVec2, UVec2};
use robot_game_core::{CellCoord, Input, SpriteKey, TileColor};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<TileColor> for Color {
    fn from(color: TileColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Axis-aligned rectangle in window pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Top-left corner in pixels.
    pub origin: IVec2,
    /// Width and height in pixels.
    pub size: UVec2,
}

impl PixelRect {
    /// Creates a new pixel rectangle.
    #[must_use]
    pub const fn new(origin: IVec2, size: UVec2) -> Self {
        Self { origin, size }
    }
}

/// Nominal pixel dimensions of a sprite.
///
/// Every sprite is smaller than the default tile so that it is drawn centred
/// inside its cell.
#[must_use]
pub const fn sprite_size(sprite: SpriteKey) -> UVec2 {
    match sprite {
        SpriteKey::Robot => UVec2::new(64, 76),
        SpriteKey::Monster => UVec2::new(60, 70),
        SpriteKey::Coin => UVec2::new(40, 40),
    }
}

/// Window onto the world measured in whole tiles.
///
/// The origin is the top-left world cell currently visible. It may lie
/// outside the map; such cells are drawn as out-of-bounds tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    columns: u32,
    rows: u32,
    tile_size: u32,
    origin: CellCoord,
}

impl Viewport {
    /// Creates a viewport showing `columns × rows` tiles of `tile_size` pixels.
    pub fn new(columns: u32, rows: u32, tile_size: u32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyViewport { columns, rows });
        }
        if tile_size == 0 {
            return Err(RenderingError::ZeroTileSize);
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            origin: CellCoord::new(0, 0),
        })
    }

    /// Number of visible tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of visible tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Top-left world cell currently visible.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Width of the viewport in pixels.
    #[must_use]
    pub const fn pixel_width(&self) -> u32 {
        self.columns.saturating_mul(self.tile_size)
    }

    /// Height of the viewport in pixels.
    #[must_use]
    pub const fn pixel_height(&self) -> u32 {
        self.rows.saturating_mul(self.tile_size)
    }

    /// Moves the origin so the focus cell sits in the middle of the viewport.
    ///
    /// Halving uses integer division, so with an even extent the focus lands
    /// one cell right of or below the exact centre.
    pub fn center_on(&mut self, focus: CellCoord) {
        self.origin = focus.offset(-half(self.columns), -half(self.rows));
    }

    /// World cell shown at the provided screen tile.
    #[must_use]
    pub fn project_tile(&self, screen_column: u32, screen_row: u32) -> CellCoord {
        self.origin
            .offset(signed(screen_column), signed(screen_row))
    }

    /// Pixel rectangle covered by the provided screen tile.
    #[must_use]
    pub fn tile_rect(&self, screen_column: u32, screen_row: u32) -> PixelRect {
        let tile = signed(self.tile_size);
        PixelRect::new(
            IVec2::new(
                signed(screen_column).saturating_mul(tile),
                signed(screen_row).saturating_mul(tile),
            ),
            UVec2::splat(self.tile_size),
        )
    }

    /// Every visible screen tile in row-major order with its world cell.
    pub fn visible_tiles(&self) -> impl Iterator<Item = (u32, u32, CellCoord)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| (column, row, self.project_tile(column, row)))
        })
    }

    /// Reports whether the world cell lies within the half-open visible range.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = i64::from(cell.column()) - i64::from(self.origin.column());
        let row = i64::from(cell.row()) - i64::from(self.origin.row());
        (0..i64::from(self.columns)).contains(&column) && (0..i64::from(self.rows)).contains(&row)
    }

    /// Pixel rectangle for a sprite of the given size drawn at a world cell.
    ///
    /// Returns `None` when the cell is not visible. The sprite is centred
    /// inside its tile using integer halves of the tile and sprite extents.
    #[must_use]
    pub fn project_entity(&self, cell: CellCoord, sprite: UVec2) -> Option<PixelRect> {
        if !self.contains(cell) {
            return None;
        }

        let tile = signed(self.tile_size);
        let screen = IVec2::new(
            cell.column() - self.origin.column(),
            cell.row() - self.origin.row(),
        );
        let centring = IVec2::new(
            tile / 2 - signed(sprite.x) / 2,
            tile / 2 - signed(sprite.y) / 2,
        );

        Some(PixelRect::new(screen * tile + centring, sprite))
    }
}

fn signed(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn half(extent: u32) -> i32 {
    signed(extent / 2)
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Direction presses and releases observed this frame, in the order they
    /// are applied to the round.
    pub inputs: Vec<Input>,
    /// Whether the player asked to close the game.
    pub quit_requested: bool,
}

/// Filled rectangle drawn for a single visible tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Pixel area covered by the tile.
    pub rect: PixelRect,
    /// Fill color of the tile.
    pub color: Color,
}

/// Sprite drawn for a visible entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpritePresentation {
    /// Visual handle of the entity.
    pub sprite: SpriteKey,
    /// Pixel area covered by the sprite.
    pub rect: PixelRect,
}

/// Scene description for one frame: tiles, then sprites, then the status line.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Camera used to project the world.
    pub viewport: Viewport,
    /// Visible tiles in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Visible sprites in draw order.
    pub sprites: Vec<SpritePresentation>,
    /// Status text drawn in the top-right corner.
    pub status: String,
}

impl Scene {
    /// Creates an empty scene rendered through the provided viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            tiles: Vec::new(),
            sprites: Vec::new(),
            status: String::new(),
        }
    }

    /// Removes every tile and sprite while keeping the viewport.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.sprites.clear();
        self.status.clear();
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Color of the status text.
    pub status_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            status_color: Color::WHITE,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Robot Game scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// drawn. Returning `false` from the closure ends the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Tiles must cover at least one pixel.
    ZeroTileSize,
    /// The viewport must show at least one tile along each axis.
    EmptyViewport {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTileSize => write!(f, "tile size must be positive"),
            Self::EmptyViewport { columns, rows } => {
                write!(
                    f,
                    "viewport must show at least one tile (received {columns}x{rows})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
