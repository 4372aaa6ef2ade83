//! Sea battle state.

use super::fleet::{Ship, ShipClass, SunkShip};
use super::grid::Cell;
use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnCursor, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sea battle phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeaBattlePhase {
    /// Both players place their fleet.
    Placement,
    /// Players take turns firing.
    Battle,
    /// A fleet was sunk.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for SeaBattlePhase {
    fn stage(&self) -> Stage {
        match self {
            SeaBattlePhase::Placement => Stage::Setup,
            SeaBattlePhase::Battle => Stage::Play,
            SeaBattlePhase::Ended { .. } => Stage::Ended,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SeaBattlePhase::Placement => "PLACEMENT",
            SeaBattlePhase::Battle => "BATTLE",
            SeaBattlePhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (SeaBattlePhase::Placement, SeaBattlePhase::Battle)
                | (SeaBattlePhase::Battle, SeaBattlePhase::Ended { .. })
        )
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            SeaBattlePhase::Ended { winner } => Some(winner),
            _ => None,
        }
    }
}

/// One fired (or auto-recorded) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRecord {
    /// Target cell.
    pub cell: Cell,
    /// True if a ship was hit.
    pub hit: bool,
    /// Class of the ship this shot sank.
    pub sunk: Option<ShipClass>,
    /// True for misses recorded around a sunk ship.
    pub auto: bool,
}

/// Broadcast-safe sea battle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SeaBattlePublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: SeaBattlePhase,
    #[getter(skip)]
    cursor: TurnCursor,
    ships_placed: BTreeMap<PlayerId, bool>,
    /// Shots by shooter, in order.
    shots: BTreeMap<PlayerId, Vec<ShotRecord>>,
    /// Sunk ships by owner, published when they go down.
    sunk_ships: BTreeMap<PlayerId, Vec<SunkShip>>,
    last_shot: Option<ShotRecord>,
}

impl SeaBattlePublic {
    pub(super) fn new(roster: Roster) -> Self {
        let ships_placed = roster.iter().map(|p| (p.clone(), false)).collect();
        let shots = roster.iter().map(|p| (p.clone(), Vec::new())).collect();
        let sunk_ships = roster.iter().map(|p| (p.clone(), Vec::new())).collect();
        let cursor = TurnCursor::new(roster.len());
        Self {
            roster,
            phase: SeaBattlePhase::Placement,
            cursor,
            ships_placed,
            shots,
            sunk_ships,
            last_shot: None,
        }
    }

    /// True once `player` has placed a fleet.
    pub fn has_fleet(&self, player: &PlayerId) -> bool {
        self.ships_placed.get(player).copied().unwrap_or(false)
    }

    /// Shots fired by `shooter`.
    pub fn shots_by(&self, shooter: &PlayerId) -> &[ShotRecord] {
        self.shots
            .get(shooter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True if `shooter` already fired at (or auto-recorded) `cell`.
    pub fn already_fired(&self, shooter: &PlayerId, cell: Cell) -> bool {
        self.shots_by(shooter).iter().any(|s| s.cell == cell)
    }

    /// Ships of `owner` sunk so far.
    pub fn sunk_of(&self, owner: &PlayerId) -> &[SunkShip] {
        self.sunk_ships
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn phase_mut(&mut self) -> &mut SeaBattlePhase {
        &mut self.phase
    }

    pub(super) fn cursor_mut(&mut self) -> &mut TurnCursor {
        &mut self.cursor
    }

    pub(super) fn mark_placed(&mut self, player: &PlayerId) {
        self.ships_placed.insert(player.clone(), true);
    }

    pub(super) fn record_shot(&mut self, shooter: &PlayerId, shot: ShotRecord) {
        if !shot.auto {
            self.last_shot = Some(shot.clone());
        }
        self.shots.entry(shooter.clone()).or_default().push(shot);
    }

    pub(super) fn publish_sunk(&mut self, owner: &PlayerId, ship: SunkShip) {
        self.sunk_ships.entry(owner.clone()).or_default().push(ship);
    }
}

impl CommonState for SeaBattlePublic {
    type Phase = SeaBattlePhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &SeaBattlePhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.shots.values().map(Vec::len).sum()
    }
}

/// Server-only sea battle secrets: every fleet with its hit state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeaBattleSecrets {
    /// Fleets by owner, in placement order.
    pub fleets: BTreeMap<PlayerId, Vec<Ship>>,
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeaBattleView {
    /// The public state, verbatim. Includes the opponent's sunk ships.
    #[serde(flatten)]
    pub public: SeaBattlePublic,
    /// The viewer's own fleet with hits, once placed.
    pub my_ships: Option<Vec<Ship>>,
}
