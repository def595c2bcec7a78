//! Tile grid describing the dungeon floor and its read-only queries.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Contents of a single dungeon tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor.
    Open,
    /// Impassable wall.
    Wall,
}

/// Whether the outer ring of tiles is walled off during generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// The map edge is left open; actors are contained by the map bounds only.
    #[default]
    Open,
    /// The outer ring is walled and two exits are cut into distinct sides.
    Walled,
}

/// Location of a single tile expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Dense tile grid produced by the dungeon generator.
///
/// The grid is immutable during play except for [`Dungeon::clear_spawn_area`],
/// which carves a 2×2 open block around a spawn point or exit.
#[derive(Clone, Debug, PartialEq)]
pub struct Dungeon {
    columns: u32,
    rows: u32,
    tile_length: f32,
    tiles: Vec<TileKind>,
}

impl Dungeon {
    /// Creates a dungeon whose tiles are all open.
    #[must_use]
    pub fn open(columns: u32, rows: u32, tile_length: f32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tile_length,
            tiles: vec![TileKind::Open; capacity],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile in world units.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the map in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the map in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Rectangle covering the whole map.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.width(), self.height()))
    }

    /// Returns the kind of the tile at `coord`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<TileKind> {
        self.index(coord).and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the tile at `coord` exists and is open.
    #[must_use]
    pub fn is_open(&self, coord: TileCoord) -> bool {
        self.tile(coord) == Some(TileKind::Open)
    }

    /// Overwrites the tile at `coord`. Coordinates outside the grid are ignored.
    pub fn set_tile(&mut self, coord: TileCoord, kind: TileKind) {
        if let Some(index) = self.index(coord) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// World-space rectangle covered by the tile at `coord`.
    #[must_use]
    pub fn tile_rect(&self, coord: TileCoord) -> Rect {
        Rect::square(self.tile_origin(coord), self.tile_length)
    }

    /// Top-left corner of the tile at `coord` in world units.
    #[must_use]
    pub fn tile_origin(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            coord.column() as f32 * self.tile_length,
            coord.row() as f32 * self.tile_length,
        )
    }

    /// Tile containing the provided world-space point, if it lies on the map.
    #[must_use]
    pub fn tile_at(&self, point: Vec2) -> Option<TileCoord> {
        if self.tile_length <= f32::EPSILON || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / self.tile_length).floor() as u32;
        let row = (point.y / self.tile_length).floor() as u32;
        if column < self.columns && row < self.rows {
            Some(TileCoord::new(column, row))
        } else {
            None
        }
    }

    /// One tile-sized rectangle per wall tile, in row-major order.
    #[must_use]
    pub fn wall_rects(&self) -> Vec<Rect> {
        self.coords()
            .filter(|coord| self.tile(*coord) == Some(TileKind::Wall))
            .map(|coord| self.tile_rect(coord))
            .collect()
    }

    /// Number of open tiles in the grid.
    #[must_use]
    pub fn open_tile_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| **tile == TileKind::Open)
            .count()
    }

    /// Samples tiles uniformly until an open one is found and returns its
    /// top-left corner.
    ///
    /// Returns `None` only when the grid contains no open tile, so the
    /// rejection loop always terminates.
    pub fn random_open_position<R>(&self, rng: &mut R) -> Option<Vec2>
    where
        R: Rng + ?Sized,
    {
        self.random_open_tile(rng).map(|coord| self.tile_origin(coord))
    }

    /// Samples tiles uniformly until an open one is found.
    pub fn random_open_tile<R>(&self, rng: &mut R) -> Option<TileCoord>
    where
        R: Rng + ?Sized,
    {
        if self.open_tile_count() == 0 {
            return None;
        }

        loop {
            let coord = TileCoord::new(
                rng.gen_range(0..self.columns),
                rng.gen_range(0..self.rows),
            );
            if self.is_open(coord) {
                return Some(coord);
            }
        }
    }

    /// Forces the 2×2 block anchored at `coord` open.
    ///
    /// Anchors on the last column or row shift inward so the block always
    /// lies inside the grid.
    pub fn clear_spawn_area(&mut self, coord: TileCoord) {
        if self.columns == 0 || self.rows == 0 {
            return;
        }

        let column = coord.column().min(self.columns.saturating_sub(2));
        let row = coord.row().min(self.rows.saturating_sub(2));
        for row_offset in 0..2 {
            for column_offset in 0..2 {
                self.set_tile(
                    TileCoord::new(column + column_offset, row + row_offset),
                    TileKind::Open,
                );
            }
        }
    }

    /// Iterates every tile coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| TileCoord::new(column, row)))
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if coord.column() < self.columns && coord.row() < self.rows {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
