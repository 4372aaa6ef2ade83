//! Sea battle invariants.

use super::contracts::SeaBattle;
use super::fleet::{fleet_is_separated, fleet_size};
use crate::core::{Invariant, Snapshot};

/// Invariant: every stored fleet is complete and its ships neither overlap
/// nor touch.
pub struct FleetsSeparated;

impl<'a> Invariant<Snapshot<'a, SeaBattle>> for FleetsSeparated {
    fn holds(state: &Snapshot<'a, SeaBattle>) -> bool {
        state
            .secrets
            .fleets
            .values()
            .all(|fleet| fleet.len() == fleet_size() && fleet_is_separated(fleet))
    }

    fn description() -> &'static str {
        "Fleets are complete and ships never touch"
    }
}

/// Invariant: hits are distinct cells of the ship, and a ship is sunk
/// exactly when it has one hit per cell.
pub struct SunkMeansFullyHit;

impl<'a> Invariant<Snapshot<'a, SeaBattle>> for SunkMeansFullyHit {
    fn holds(state: &Snapshot<'a, SeaBattle>) -> bool {
        state.secrets.fleets.values().flatten().all(|ship| {
            let distinct = ship
                .hits
                .iter()
                .enumerate()
                .all(|(i, h)| ship.cells.contains(h) && !ship.hits[..i].contains(h));
            distinct && ship.sunk == (ship.hits.len() == ship.size)
        })
    }

    fn description() -> &'static str {
        "A ship sinks after exactly one hit per cell"
    }
}

/// Invariant: the published sunk ships are exactly the sunk ships.
pub struct SunkShipsPublished;

impl<'a> Invariant<Snapshot<'a, SeaBattle>> for SunkShipsPublished {
    fn holds(state: &Snapshot<'a, SeaBattle>) -> bool {
        state.secrets.fleets.iter().all(|(owner, fleet)| {
            let published = state.public.sunk_of(owner);
            let sunk = fleet.iter().filter(|s| s.sunk).count();
            published.len() == sunk
                && published
                    .iter()
                    .all(|p| fleet.iter().any(|s| s.sunk && s.id == p.id))
        })
    }

    fn description() -> &'static str {
        "Every sunk ship is published and nothing else"
    }
}

/// All sea battle invariants.
pub type SeaBattleInvariants = (FleetsSeparated, SunkMeansFullyHit, SunkShipsPublished);
