//! Sea battle payloads and reports.

use super::fleet::{Ship, ShipPlacement, SunkShip};
use super::grid::Cell;
use crate::core::PlayerId;
use serde::{Deserialize, Serialize};

/// Setup payload: the whole fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetPlacement {
    /// One entry per ship.
    pub ships: Vec<ShipPlacement>,
}

/// Move payload: a shot at the opponent's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Shot {
    /// Row, 0-9.
    pub row: i32,
    /// Column, 0-9.
    pub col: i32,
}

/// A fleet that passed every placement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFleet(pub(super) Vec<Ship>);

/// An in-bounds, not yet fired cell with its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedShot {
    pub(super) cell: Cell,
    pub(super) target: PlayerId,
}

/// Result of a resolved shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotReport {
    /// Who fired.
    pub shooter: PlayerId,
    /// Whose fleet was targeted.
    pub target: PlayerId,
    /// Target cell.
    pub cell: Cell,
    /// True if a ship was hit.
    pub hit: bool,
    /// The ship this shot sank.
    pub sunk: Option<SunkShip>,
    /// Cells auto-recorded as misses around the sunk ship.
    pub auto_misses: Vec<Cell>,
    /// True if the shot sank the last ship.
    pub won: bool,
}
