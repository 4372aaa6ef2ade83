//! Fleet composition and placement rules.

use super::grid::{Cell, Coord, halo};
use crate::core::{GameError, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Ship classes of the standard fleet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ShipClass {
    /// Four cells, one per fleet.
    Battleship,
    /// Three cells, two per fleet.
    Cruiser,
    /// Two cells, three per fleet.
    Destroyer,
    /// One cell, four per fleet.
    Submarine,
}

impl ShipClass {
    /// Cells per ship.
    pub fn size(self) -> usize {
        match self {
            ShipClass::Battleship => 4,
            ShipClass::Cruiser => 3,
            ShipClass::Destroyer => 2,
            ShipClass::Submarine => 1,
        }
    }

    /// Ships of this class in a fleet.
    pub fn count(self) -> usize {
        match self {
            ShipClass::Battleship => 1,
            ShipClass::Cruiser => 2,
            ShipClass::Destroyer => 3,
            ShipClass::Submarine => 4,
        }
    }
}

/// Total ships in a fleet.
pub fn fleet_size() -> usize {
    ShipClass::iter().map(ShipClass::count).sum()
}

/// One ship as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipPlacement {
    /// Class of the ship.
    pub class: ShipClass,
    /// Raw cells, in any order.
    pub cells: Vec<Coord>,
}

/// A placed ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Stable id, `<owner>-ship-<index>`.
    pub id: String,
    /// Class of the ship.
    pub class: ShipClass,
    /// Cells per ship.
    pub size: usize,
    /// Occupied cells, sorted.
    pub cells: Vec<Cell>,
    /// Cells hit so far, in order.
    pub hits: Vec<Cell>,
    /// True once every cell is hit.
    pub sunk: bool,
}

impl Ship {
    /// Records a hit at `cell` if the ship occupies it and it was not hit
    /// there yet. Returns true if the hit landed.
    pub fn take_hit(&mut self, cell: Cell) -> bool {
        if !self.cells.contains(&cell) || self.hits.contains(&cell) {
            return false;
        }
        self.hits.push(cell);
        if self.hits.len() == self.size {
            self.sunk = true;
        }
        true
    }
}

/// A ship revealed by sinking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunkShip {
    /// Id of the ship.
    pub id: String,
    /// Class of the ship.
    pub class: ShipClass,
    /// Its cells.
    pub cells: Vec<Cell>,
}

impl From<&Ship> for SunkShip {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id.clone(),
            class: ship.class,
            cells: ship.cells.clone(),
        }
    }
}

/// Checks composition: exactly the expected number of ships of each class.
pub fn check_composition(ships: &[ShipPlacement]) -> Result<(), GameError> {
    let mut counts: BTreeMap<ShipClass, usize> = BTreeMap::new();
    for ship in ships {
        *counts.entry(ship.class).or_default() += 1;
    }
    for class in ShipClass::iter() {
        let got = counts.get(&class).copied().unwrap_or(0);
        if got != class.count() {
            return Err(GameError::invalid(format!(
                "fleet needs {} {class}(s), got {got}",
                class.count()
            )));
        }
    }
    Ok(())
}

/// Validates one ship's cells: bounds, size, and a straight contiguous line.
pub fn check_shape(ship: &ShipPlacement) -> Result<Vec<Cell>, GameError> {
    let mut cells = ship
        .cells
        .iter()
        .map(|c| Cell::try_from(*c))
        .collect::<Result<Vec<_>, _>>()?;
    if cells.len() != ship.class.size() {
        return Err(GameError::invalid(format!(
            "{} needs {} cells, got {}",
            ship.class,
            ship.class.size(),
            cells.len()
        )));
    }
    cells.sort();
    let horizontal = cells.iter().all(|c| c.row() == cells[0].row());
    let vertical = cells.iter().all(|c| c.col() == cells[0].col());
    let contiguous = cells.windows(2).all(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if horizontal {
            b.col() == a.col() + 1
        } else {
            b.row() == a.row() + 1
        }
    });
    if !(horizontal || vertical) || !contiguous {
        return Err(GameError::invalid(format!(
            "{} must be a straight unbroken line",
            ship.class
        )));
    }
    Ok(cells)
}

/// Validates a whole fleet and builds its ships in placement order.
///
/// Ships may neither overlap nor touch, diagonals included.
#[instrument(skip(ships), fields(owner = %owner, ships = ships.len()))]
pub fn place_fleet(owner: &PlayerId, ships: &[ShipPlacement]) -> Result<Vec<Ship>, GameError> {
    check_composition(ships)?;
    let mut occupied: BTreeSet<Cell> = BTreeSet::new();
    let mut blocked: BTreeSet<Cell> = BTreeSet::new();
    let mut fleet = Vec::with_capacity(ships.len());

    for (index, placement) in ships.iter().enumerate() {
        let cells = check_shape(placement)?;
        if let Some(clash) = cells
            .iter()
            .find(|c| occupied.contains(*c) || blocked.contains(*c))
        {
            return Err(GameError::invalid(format!(
                "{} at {clash} overlaps or touches another ship",
                placement.class
            )));
        }
        occupied.extend(cells.iter().copied());
        blocked.extend(halo(&cells));
        fleet.push(Ship {
            id: format!("{owner}-ship-{index}"),
            class: placement.class,
            size: placement.class.size(),
            cells,
            hits: Vec::new(),
            sunk: false,
        });
    }
    Ok(fleet)
}

/// True if no two ships share a cell or touch.
pub fn fleet_is_separated(fleet: &[Ship]) -> bool {
    fleet.iter().enumerate().all(|(i, a)| {
        let around = halo(&a.cells);
        fleet.iter().skip(i + 1).all(|b| {
            b.cells
                .iter()
                .all(|c| !a.cells.contains(c) && !around.contains(c))
        })
    })
}

/// A legal standard fleet, for tests and demos.
pub fn standard_layout() -> Vec<ShipPlacement> {
    let line = |class: ShipClass, row: i32, col: i32| ShipPlacement {
        class,
        cells: (0..class.size() as i32)
            .map(|d| Coord::new(row, col + d))
            .collect(),
    };
    vec![
        line(ShipClass::Battleship, 0, 0),
        line(ShipClass::Cruiser, 0, 6),
        line(ShipClass::Cruiser, 2, 0),
        line(ShipClass::Destroyer, 2, 5),
        line(ShipClass::Destroyer, 2, 8),
        line(ShipClass::Destroyer, 4, 0),
        line(ShipClass::Submarine, 4, 4),
        line(ShipClass::Submarine, 4, 6),
        line(ShipClass::Submarine, 4, 8),
        line(ShipClass::Submarine, 6, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> PlayerId {
        PlayerId::from("ann")
    }

    #[test]
    fn test_fleet_size_is_ten() {
        assert_eq!(fleet_size(), 10);
    }

    #[test]
    fn test_standard_layout_is_legal() {
        let fleet = place_fleet(&owner(), &standard_layout()).unwrap();
        assert_eq!(fleet.len(), 10);
        assert_eq!(fleet[0].id, "ann-ship-0");
        assert!(fleet_is_separated(&fleet));
    }

    #[test]
    fn test_missing_ship_rejected() {
        let mut layout = standard_layout();
        layout.pop();
        assert!(place_fleet(&owner(), &layout).is_err());
    }

    #[test]
    fn test_diagonal_touch_rejected() {
        let mut layout = standard_layout();
        // Last submarine moved diagonally adjacent to the one at (4, 8).
        layout[9].cells = vec![Coord::new(5, 9)];
        assert!(place_fleet(&owner(), &layout).is_err());
    }

    #[test]
    fn test_bent_ship_rejected() {
        let ship = ShipPlacement {
            class: ShipClass::Cruiser,
            cells: vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 1)],
        };
        assert!(check_shape(&ship).is_err());
    }

    #[test]
    fn test_gapped_ship_rejected() {
        let ship = ShipPlacement {
            class: ShipClass::Destroyer,
            cells: vec![Coord::new(3, 0), Coord::new(5, 0)],
        };
        assert!(check_shape(&ship).is_err());
    }

    #[test]
    fn test_vertical_unordered_ship_accepted() {
        let ship = ShipPlacement {
            class: ShipClass::Cruiser,
            cells: vec![Coord::new(5, 2), Coord::new(3, 2), Coord::new(4, 2)],
        };
        let cells = check_shape(&ship).unwrap();
        assert_eq!(cells[0], Cell::new(3, 2).unwrap());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let ship = ShipPlacement {
            class: ShipClass::Destroyer,
            cells: vec![Coord::new(0, 9), Coord::new(0, 10)],
        };
        assert!(check_shape(&ship).is_err());
    }
}
