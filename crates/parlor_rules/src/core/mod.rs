//! Scaffolding shared by every variant: identity, errors, phases, turns,
//! contracts, and invariants.

mod contracts;
mod error;
mod ids;
pub mod invariants;
mod phase;
mod state;
pub mod text;
mod turn;

pub use contracts::{NoSetup, SetupOutcome, Snapshot, Table, Timed, Variant};
pub use error::{GameError, GameErrorKind};
pub use ids::{PlayerId, Roster};
pub use invariants::{Invariant, InvariantSet, InvariantViolation, StepInvariant};
pub use phase::{Lifecycle, Stage, Status, Winner, transition, wrong_phase};
pub use state::CommonState;
pub use turn::{TurnClock, TurnCursor, TurnEffect};

/// Validator steps 2 and 3: the actor is seated and, if given, on turn.
pub fn seated_on_turn<S: CommonState>(
    state: &S,
    actor: &PlayerId,
    turn_gated: bool,
) -> Result<(), GameError> {
    if !state.roster().contains(actor) {
        return Err(GameError::NotAPlayer {
            player: actor.clone(),
        });
    }
    if turn_gated {
        if let Some(expected) = state.current_player() {
            if expected != actor {
                return Err(GameError::NotYourTurn {
                    player: actor.clone(),
                    expected: expected.clone(),
                });
            }
        }
    }
    Ok(())
}
