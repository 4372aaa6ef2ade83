//! Accessors every variant's public state provides.

use super::ids::{PlayerId, Roster};
use super::phase::{Lifecycle, Stage, Status, Winner};
use super::turn::TurnCursor;

/// Fields shared by every variant's public state.
pub trait CommonState {
    /// The variant's phase enum.
    type Phase: Lifecycle;

    /// Seated players in order.
    fn roster(&self) -> &Roster;

    /// Current phase.
    fn phase(&self) -> &Self::Phase;

    /// Turn cursor, if the variant rotates turns.
    fn cursor(&self) -> Option<&TurnCursor>;

    /// Number of entries in the move log.
    fn log_len(&self) -> usize;

    /// Coarse stage of the current phase.
    fn stage(&self) -> Stage {
        self.phase().stage()
    }

    /// Broadcast status.
    fn status(&self) -> Status {
        self.stage().into()
    }

    /// Winner, once ended.
    fn winner(&self) -> Option<&Winner> {
        self.phase().winner()
    }

    /// Player whose turn it is, if any.
    fn current_player(&self) -> Option<&PlayerId> {
        if self.stage() != Stage::Play {
            return None;
        }
        self.cursor().and_then(|c| self.roster().get(c.index()))
    }
}
