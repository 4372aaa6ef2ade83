//! Sea battle: two hidden fleets on 10x10 grids, one shot per turn.

mod action;
mod contracts;
mod fleet;
mod grid;
mod invariants;
mod types;

pub use action::{AcceptedFleet, AcceptedShot, FleetPlacement, Shot, ShotReport};
pub use contracts::SeaBattle;
pub use fleet::{
    Ship, ShipClass, ShipPlacement, SunkShip, check_composition, check_shape, fleet_is_separated,
    fleet_size, place_fleet, standard_layout,
};
pub use grid::{Cell, Coord, GRID_SIZE, halo};
pub use invariants::{FleetsSeparated, SeaBattleInvariants, SunkMeansFullyHit, SunkShipsPublished};
pub use types::{SeaBattlePhase, SeaBattlePublic, SeaBattleSecrets, SeaBattleView, ShotRecord};
