use rand::Rng;
use robot_game_core::{CellCoord, TileColor, TileKind};

use crate::WorldError;

/// Static grid of floor and wall tiles.
///
/// Queries outside the grid never fail; they resolve to
/// [`TileKind::OutOfBounds`], which is always collidable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl TileMap {
    /// Builds a map from rows of layout identifiers (`0` floor, `1` wall).
    ///
    /// Every row must have the same length as the first one.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, WorldError>
    where
        R: AsRef<[u8]>,
    {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        if rows.is_empty() || expected == 0 {
            return Err(WorldError::EmptyMap);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(WorldError::InvalidMapShape {
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }

            for (column_index, &value) in row.iter().enumerate() {
                let kind = TileKind::from_layout_id(value).ok_or(WorldError::UnknownTile {
                    value,
                    column: column_index,
                    row: row_index,
                })?;
                tiles.push(kind);
            }
        }

        Ok(Self {
            columns: dimension(expected)?,
            rows: dimension(rows.len())?,
            tiles,
        })
    }

    /// Generates a map where every cell independently becomes a wall with the
    /// provided probability.
    pub fn random<R>(
        columns: u32,
        rows: u32,
        wall_probability: f64,
        rng: &mut R,
    ) -> Result<Self, WorldError>
    where
        R: Rng + ?Sized,
    {
        if columns == 0 || rows == 0 {
            return Err(WorldError::EmptyMap);
        }
        if !wall_probability.is_finite() || !(0.0..=1.0).contains(&wall_probability) {
            return Err(WorldError::InvalidWallProbability {
                probability: wall_probability,
            });
        }

        let capacity = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| WorldError::EmptyMap)?;
        let tiles = (0..capacity)
            .map(|_| {
                if rng.gen_bool(wall_probability) {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                }
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            tiles,
        })
    }

    /// Number of columns contained in the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the map.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Tile stored at the provided cell, or [`TileKind::OutOfBounds`] outside the map.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> TileKind {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(TileKind::OutOfBounds)
    }

    /// Reports whether the tile at the provided cell blocks entry.
    #[must_use]
    pub fn is_collidable(&self, cell: CellCoord) -> bool {
        self.kind_at(cell).is_collidable()
    }

    /// Display color associated with a tile kind.
    #[must_use]
    pub const fn color_of(kind: TileKind) -> TileColor {
        kind.color()
    }

    /// Number of in-bounds cells that do not block entry.
    #[must_use]
    pub fn open_cell_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|kind| !kind.is_collidable())
            .count()
    }

    /// Overwrites a stored tile.
    ///
    /// Returns `false` without modifying the map when the cell lies outside the
    /// grid or the requested kind is [`TileKind::OutOfBounds`].
    pub fn set_kind(&mut self, cell: CellCoord, kind: TileKind) -> bool {
        if kind == TileKind::OutOfBounds {
            return false;
        }

        match self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            Some(slot) => {
                *slot = kind;
                true
            }
            None => false,
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            let width = usize::try_from(self.columns).ok()?;
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn dimension(length: usize) -> Result<u32, WorldError> {
    u32::try_from(length).map_err(|_| WorldError::EmptyMap)
}
