//! Sparse tile storage keyed by packed cell coordinates.

use std::collections::HashMap;

use dungeon_snake_core::{Axis, CellCoord, RoomId, Tile};
use serde::{Deserialize, Serialize};

/// Sparse map from grid cell to tile symbol. Absent cells are void.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileGrid {
    tiles: HashMap<u64, Tile>,
}

impl TileGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tile stored at the cell, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Tile> {
        self.tiles.get(&cell.key()).copied()
    }

    /// Stores a tile, replacing whatever was there.
    pub fn set(&mut self, cell: CellCoord, tile: Tile) {
        let _ = self.tiles.insert(cell.key(), tile);
    }

    /// Stores a tile only when the cell is still void. Returns whether it was stored.
    pub fn set_if_void(&mut self, cell: CellCoord, tile: Tile) -> bool {
        if self.tiles.contains_key(&cell.key()) {
            return false;
        }
        let _ = self.tiles.insert(cell.key(), tile);
        true
    }

    /// Clears the cell back to void.
    pub fn remove(&mut self, cell: CellCoord) -> Option<Tile> {
        self.tiles.remove(&cell.key())
    }

    /// Reports whether actors can stand on the cell. Void is never open.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some_and(Tile::is_open)
    }

    /// Reports whether the cell blocks movement, void included.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        !self.is_open(cell)
    }

    /// Number of non-void cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether every cell is void.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates over every stored tile in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        self.tiles
            .iter()
            .map(|(key, tile)| (CellCoord::from_key(*key), *tile))
    }

    /// Cells holding the provided tile, sorted for deterministic iteration.
    #[must_use]
    pub fn cells_with(&self, tile: Tile) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = self
            .iter()
            .filter(|(_, stored)| *stored == tile)
            .map(|(cell, _)| cell)
            .collect();
        cells.sort_by_key(|cell| (cell.y(), cell.x()));
        cells
    }

    /// Smallest rectangle enclosing every stored tile.
    #[must_use]
    pub fn extent(&self) -> Option<Bounds> {
        let mut cells = self.iter().map(|(cell, _)| cell);
        let first = cells.next()?;
        let initial = Bounds {
            min_x: first.x(),
            min_y: first.y(),
            max_x: first.x(),
            max_y: first.y(),
        };
        Some(cells.fold(initial, |bounds, cell| bounds.including(cell)))
    }
}

/// Inclusive rectangle of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Leftmost column.
    pub min_x: i32,
    /// Topmost row.
    pub min_y: i32,
    /// Rightmost column.
    pub max_x: i32,
    /// Bottom row.
    pub max_y: i32,
}

impl Bounds {
    /// Grows the bounds so they include the cell.
    #[must_use]
    pub fn including(self, cell: CellCoord) -> Self {
        Self {
            min_x: self.min_x.min(cell.x()),
            min_y: self.min_y.min(cell.y()),
            max_x: self.max_x.max(cell.x()),
            max_y: self.max_y.max(cell.y()),
        }
    }

    /// Expands every side by `amount` cells.
    #[must_use]
    pub const fn padded(self, amount: i32) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Number of columns covered.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.max_x.abs_diff(self.min_x) + 1
    }

    /// Number of rows covered.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.max_y.abs_diff(self.min_y) + 1
    }
}

/// Decoration metadata attached to a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMeta {
    /// Room whose rectangle produced the tile.
    pub room: Option<RoomId>,
    /// Tile is part of a room's wall ring.
    pub is_wall: bool,
    /// Tile lies inside a room rectangle.
    pub is_room: bool,
    /// Tile is one of a room's four corners.
    pub is_corner: bool,
    /// Tile was carved by a corridor.
    pub is_corridor: bool,
    /// Tile is a door joining a room to a corridor.
    pub is_connection: bool,
    /// Axis the carving corridor ran along.
    pub corridor_direction: Option<Axis>,
}

/// Sparse metadata map keyed like [`TileGrid`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileMetaMap {
    entries: HashMap<u64, TileMeta>,
}

impl TileMetaMap {
    /// Creates an empty metadata map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata stored for the cell, if any.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&TileMeta> {
        self.entries.get(&cell.key())
    }

    /// Mutable metadata for the cell, created on first access.
    pub fn entry(&mut self, cell: CellCoord) -> &mut TileMeta {
        self.entries.entry(cell.key()).or_default()
    }

    /// Removes metadata for the cell.
    pub fn remove(&mut self, cell: CellCoord) -> Option<TileMeta> {
        self.entries.remove(&cell.key())
    }

    /// Number of annotated cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no cell carries metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
