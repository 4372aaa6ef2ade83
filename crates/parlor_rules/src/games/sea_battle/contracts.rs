//! Sea battle preconditions, resolver and projection.

use super::action::{AcceptedFleet, AcceptedShot, FleetPlacement, Shot, ShotReport};
use super::fleet::{SunkShip, place_fleet};
use super::grid::{Cell, halo};
use super::invariants::SeaBattleInvariants;
use super::types::{SeaBattlePhase, SeaBattlePublic, SeaBattleSecrets, SeaBattleView, ShotRecord};
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, PlayerId, Roster, Snapshot, Table,
    Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// The sea battle variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeaBattle;

impl SeaBattle {
    /// Creates a two-player sea battle table awaiting both fleets.
    #[instrument(skip(players), fields(players = players.len()))]
    pub fn create(players: Vec<PlayerId>) -> Result<Table<SeaBattle>, GameError> {
        let roster = Roster::with_bounds(players, 2, Some(2))?;
        info!("Sea battle game created");
        Ok(Table::fresh(
            SeaBattlePublic::new(roster),
            SeaBattleSecrets::default(),
        ))
    }
}

impl Variant for SeaBattle {
    const NAME: &'static str = "sea_battle";

    type Public = SeaBattlePublic;
    type Secrets = SeaBattleSecrets;
    type Setup = FleetPlacement;
    type AcceptedSetup = AcceptedFleet;
    type Move = Shot;
    type AcceptedMove = AcceptedShot;
    type Report = ShotReport;
    type View = SeaBattleView;

    fn check_setup(
        public: &SeaBattlePublic,
        _secrets: &SeaBattleSecrets,
        actor: &PlayerId,
        setup: &FleetPlacement,
    ) -> Result<AcceptedFleet, GameError> {
        if public.phase() != &SeaBattlePhase::Placement {
            return Err(wrong_phase(public.phase(), "place_ships"));
        }
        seated_on_turn(public, actor, false)?;
        let fleet = place_fleet(actor, &setup.ships)?;
        if public.has_fleet(actor) {
            return Err(GameError::duplicate("ships already placed"));
        }
        Ok(AcceptedFleet(fleet))
    }

    fn resolve_setup(
        public: &mut SeaBattlePublic,
        secrets: &mut SeaBattleSecrets,
        actor: &PlayerId,
        accepted: AcceptedFleet,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        secrets.fleets.insert(actor.clone(), accepted.0);
        public.mark_placed(actor);
        debug!(player = %actor, "Fleet placed");

        if public.roster().iter().all(|p| public.has_fleet(p)) {
            transition(public.phase_mut(), SeaBattlePhase::Battle)?;
            public.cursor_mut().reset();
            info!("Both fleets placed, battle starts");
        }
        Ok(())
    }

    fn check_move(
        public: &SeaBattlePublic,
        _secrets: &SeaBattleSecrets,
        actor: &PlayerId,
        action: &Shot,
    ) -> Result<AcceptedShot, GameError> {
        if public.phase() != &SeaBattlePhase::Battle {
            return Err(wrong_phase(public.phase(), "fire"));
        }
        seated_on_turn(public, actor, true)?;
        let cell = Cell::new(action.row, action.col)?;
        if public.already_fired(actor, cell) {
            return Err(GameError::duplicate(format!("already fired at {cell}")));
        }
        let target =
            public
                .roster()
                .opponent_of(actor)
                .cloned()
                .ok_or_else(|| GameError::NotAPlayer {
                    player: actor.clone(),
                })?;
        Ok(AcceptedShot { cell, target })
    }

    fn resolve_move(
        public: &mut SeaBattlePublic,
        secrets: &mut SeaBattleSecrets,
        actor: &PlayerId,
        accepted: AcceptedShot,
        _now: DateTime<Utc>,
    ) -> Result<ShotReport, GameError> {
        let AcceptedShot { cell, target } = accepted;
        let fleet = secrets
            .fleets
            .get_mut(&target)
            .ok_or(GameError::SecretsMissing)?;

        let struck = fleet.iter_mut().find_map(|ship| {
            ship.take_hit(cell)
                .then(|| ship.sunk.then(|| SunkShip::from(&*ship)))
        });
        let hit = struck.is_some();
        let sunk = struck.flatten();
        let won = fleet.iter().all(|s| s.sunk);

        public.record_shot(
            actor,
            ShotRecord {
                cell,
                hit,
                sunk: sunk.as_ref().map(|s| s.class),
                auto: false,
            },
        );

        let mut auto_misses = Vec::new();
        if let Some(ship) = &sunk {
            for around in halo(&ship.cells) {
                if !public.already_fired(actor, around) {
                    public.record_shot(
                        actor,
                        ShotRecord {
                            cell: around,
                            hit: false,
                            sunk: None,
                            auto: true,
                        },
                    );
                    auto_misses.push(around);
                }
            }
            public.publish_sunk(&target, ship.clone());
            info!(owner = %target, class = %ship.class, "Ship sunk");
        }
        debug!(%cell, hit, won, "Shot resolved");

        if won {
            transition(
                public.phase_mut(),
                SeaBattlePhase::Ended {
                    winner: Winner::Player(actor.clone()),
                },
            )?;
        } else {
            public.cursor_mut().pass();
        }

        Ok(ShotReport {
            shooter: actor.clone(),
            target,
            cell,
            hit,
            sunk,
            auto_misses,
            won,
        })
    }

    fn project(
        public: &SeaBattlePublic,
        secrets: &SeaBattleSecrets,
        viewer: &PlayerId,
    ) -> SeaBattleView {
        SeaBattleView {
            public: public.clone(),
            my_ships: secrets.fleets.get(viewer).cloned(),
        }
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        SeaBattleInvariants::check_all(state)
    }
}
