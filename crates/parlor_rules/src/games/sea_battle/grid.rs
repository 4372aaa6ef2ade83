//! Grid coordinates.

use crate::core::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Side of the square grid.
pub const GRID_SIZE: u8 = 10;

/// A cell on the grid, always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Coord", into = "Coord")]
pub struct Cell {
    row: u8,
    col: u8,
}

/// Raw coordinates as submitted, possibly out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Coord {
    /// Row, 0 at the top.
    pub row: i32,
    /// Column, 0 on the left.
    pub col: i32,
}

impl Cell {
    /// Validated cell, or `InvalidPayload` when off the grid.
    pub fn new(row: i32, col: i32) -> Result<Self, GameError> {
        let size = i32::from(GRID_SIZE);
        if !(0..size).contains(&row) || !(0..size).contains(&col) {
            return Err(GameError::invalid(format!(
                "cell ({row}, {col}) is outside the {GRID_SIZE}x{GRID_SIZE} grid"
            )));
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    /// Row index.
    pub fn row(&self) -> u8 {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> u8 {
        self.col
    }

    /// In-bounds cells around this one, diagonals included.
    pub fn neighbours(&self) -> impl Iterator<Item = Cell> + use<> {
        let (row, col) = (i32::from(self.row), i32::from(self.col));
        (-1..=1)
            .flat_map(|dr| (-1..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| (dr, dc) != (0, 0))
            .filter_map(move |(dr, dc)| Cell::new(row + dr, col + dc).ok())
    }
}

impl TryFrom<Coord> for Cell {
    type Error = GameError;

    fn try_from(coord: Coord) -> Result<Self, Self::Error> {
        Cell::new(coord.row, coord.col)
    }
}

impl From<Cell> for Coord {
    fn from(cell: Cell) -> Self {
        Coord::new(i32::from(cell.row), i32::from(cell.col))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cells touching `cells` (8-neighbourhood), excluding `cells` themselves.
pub fn halo(cells: &[Cell]) -> BTreeSet<Cell> {
    let mut around: BTreeSet<Cell> = cells.iter().flat_map(|c| c.neighbours()).collect();
    for c in cells {
        around.remove(c);
    }
    around
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Cell::new(0, 0).is_ok());
        assert!(Cell::new(9, 9).is_ok());
        assert!(Cell::new(10, 0).is_err());
        assert!(Cell::new(0, -1).is_err());
    }

    #[test]
    fn test_corner_has_three_neighbours() {
        assert_eq!(Cell::new(0, 0).unwrap().neighbours().count(), 3);
        assert_eq!(Cell::new(5, 5).unwrap().neighbours().count(), 8);
    }

    #[test]
    fn test_halo_of_row_segment() {
        let cells: Vec<Cell> = (0..4).map(|c| Cell::new(0, c).unwrap()).collect();
        let around = halo(&cells);
        // Row 1, columns 0-4, plus (0, 4).
        assert_eq!(around.len(), 6);
        assert!(around.contains(&Cell::new(0, 4).unwrap()));
        assert!(!around.contains(&Cell::new(0, 2).unwrap()));
    }

    #[test]
    fn test_cell_rejects_out_of_bounds_json() {
        assert!(serde_json::from_str::<Cell>(r#"{"row":3,"col":12}"#).is_err());
        let cell: Cell = serde_json::from_str(r#"{"row":3,"col":4}"#).unwrap();
        assert_eq!(cell.col(), 4);
    }
}
