//! Semantic model of the house.
//!
//! This module provides:
//! - Grid cell coordinates and neighborhoods
//! - Tile codes and the dynamic tile registry
//! - The semantic occupancy grid loaded from text
//! - The room registry with bounding boxes and connectors

pub mod grid;
pub mod rooms;
pub mod tiles;

pub use grid::SemanticGrid;
pub use rooms::{Room, RoomObject, RoomRegistry};
pub use tiles::{TileKind, TileRegistry, CAMERA, DOOR, ENTRY, FREE, UNKNOWN, WALL};

use serde::{Deserialize, Serialize};

/// A cell on the house grid.
///
/// Coordinates are (x, y) with x growing rightward across a row and
/// y growing downward across rows, matching the row-major text encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    pub fn manhattan(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance to another cell.
    pub fn euclidean(&self, other: &Cell) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Chebyshev distance to another cell (8-connected step count).
    pub fn chebyshev(&self, other: &Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The 4-connected (axis) neighborhood.
    pub fn neighbors_4(&self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }

    /// The 8-connected neighborhood: four axis neighbors first, then the
    /// four diagonals.
    pub fn neighbors_8(&self) -> [Cell; 8] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x + 1, self.y + 1),
            Cell::new(self.x - 1, self.y - 1),
            Cell::new(self.x + 1, self.y - 1),
            Cell::new(self.x - 1, self.y + 1),
        ]
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(a.chebyshev(&b), 4);
        assert!((a.euclidean(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_neighbors_axis_first() {
        let c = Cell::new(5, 5);
        let n = c.neighbors_8();
        // First four entries are axis moves, the rest diagonal
        for cell in &n[..4] {
            assert_eq!(c.manhattan(cell), 1);
        }
        for cell in &n[4..] {
            assert_eq!(c.manhattan(cell), 2);
            assert_eq!(c.chebyshev(cell), 1);
        }
    }
}
