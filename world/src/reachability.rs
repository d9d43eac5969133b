//! Breadth-first reachability over open tiles.

use std::collections::{HashMap, VecDeque};

use dungeon_snake_core::{CellCoord, Direction};

use crate::tiles::TileGrid;

/// Step distances from a seed cell to every open cell it can reach.
///
/// Only floor, door and corridor tiles are traversed; walls and void stop the
/// search. Cells absent from the field are unreachable.
#[derive(Clone, Debug, Default)]
pub struct ReachabilityField {
    distances: HashMap<u64, u32>,
}

impl ReachabilityField {
    /// Floods the grid from `seed`. A blocked seed yields an empty field.
    #[must_use]
    pub fn flood(grid: &TileGrid, seed: CellCoord) -> Self {
        let mut distances = HashMap::new();
        if grid.is_blocked(seed) {
            return Self { distances };
        }

        let _ = distances.insert(seed.key(), 0);
        let mut queue = VecDeque::new();
        queue.push_back(seed);

        while let Some(cell) = queue.pop_front() {
            let Some(current) = distances.get(&cell.key()).copied() else {
                continue;
            };

            for direction in Direction::ALL {
                let neighbor = cell.step(direction);
                if grid.is_blocked(neighbor) || distances.contains_key(&neighbor.key()) {
                    continue;
                }
                let _ = distances.insert(neighbor.key(), current + 1);
                queue.push_back(neighbor);
            }
        }

        Self { distances }
    }

    /// Distance to the cell, if reachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.distances.get(&cell.key()).copied()
    }

    /// Whether the cell was reached.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.distances.contains_key(&cell.key())
    }

    /// Number of reached cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether nothing was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_snake_core::Tile;

    fn corridor(cells: &[(i32, i32)]) -> TileGrid {
        let mut grid = TileGrid::new();
        for &(x, y) in cells {
            grid.set(CellCoord::new(x, y), Tile::Corridor);
        }
        grid
    }

    #[test]
    fn flood_counts_steps_from_seed() {
        let grid = corridor(&[(0, 0), (1, 0), (2, 0), (2, 1)]);
        let field = ReachabilityField::flood(&grid, CellCoord::new(0, 0));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(0));
        assert_eq!(field.distance(CellCoord::new(2, 1)), Some(3));
        assert_eq!(field.len(), 4);
    }

    #[test]
    fn walls_and_void_stop_the_flood() {
        let mut grid = corridor(&[(0, 0), (2, 0), (0, 2)]);
        grid.set(CellCoord::new(1, 0), Tile::Wall);
        let field = ReachabilityField::flood(&grid, CellCoord::new(0, 0));
        assert!(!field.contains(CellCoord::new(2, 0)));
        assert!(!field.contains(CellCoord::new(0, 2)));
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn blocked_seed_reaches_nothing() {
        let grid = corridor(&[(0, 0)]);
        let field = ReachabilityField::flood(&grid, CellCoord::new(5, 5));
        assert!(field.is_empty());
    }
}
