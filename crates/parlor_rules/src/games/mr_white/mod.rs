//! Mr White: civilians share a word, one player does not, and everyone
//! clues and votes until Mr White is caught or outlasts the civilians.

mod action;
mod contracts;
mod invariants;
mod types;

pub use action::{AcceptedMrWhiteMove, MrWhiteMove, MrWhiteReport, TallyOutcome};
pub use contracts::{FairBallot, HonestClue, MrWhite, StillActive};
pub use invariants::{BallotsMatchVoters, MrWhiteInvariants, RevealedWhenDue, SeatsAccountedFor};
pub use types::{
    Clue, Elimination, MAX_CLUE_LEN, MIN_PLAYERS, MrWhitePhase, MrWhitePublic, MrWhiteSecrets,
    MrWhiteView, Role, VoteTally,
};
