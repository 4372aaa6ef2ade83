//! Mr White invariants.

use super::contracts::MrWhite;
use super::types::MrWhitePhase;
use crate::core::{CommonState, Invariant, Snapshot};

/// Invariant: every seat is either active or eliminated, and each revealed
/// role is the true one.
pub struct SeatsAccountedFor;

impl<'a> Invariant<Snapshot<'a, MrWhite>> for SeatsAccountedFor {
    fn holds(state: &Snapshot<'a, MrWhite>) -> bool {
        let public = state.public;
        let seats = public.active().len() + public.eliminated().len() == public.roster().len();
        let roles = public.eliminated().iter().all(|e| {
            !public.is_active(&e.player)
                && state
                    .secrets
                    .role_of(&e.player)
                    .is_none_or(|role| role == e.role)
        });
        seats && roles
    }

    fn description() -> &'static str {
        "Every seat is active or eliminated with its true role"
    }
}

/// Invariant: the secret ballots are exactly those of the players marked as
/// having voted.
pub struct BallotsMatchVoters;

impl<'a> Invariant<Snapshot<'a, MrWhite>> for BallotsMatchVoters {
    fn holds(state: &Snapshot<'a, MrWhite>) -> bool {
        let voted = state.public.voted();
        state.secrets.ballots.len() == voted.len()
            && voted.iter().all(|v| state.secrets.ballots.contains_key(v))
    }

    fn description() -> &'static str {
        "Secret ballots match the published voters"
    }
}

/// Invariant: the word is public only at the end, Mr White only once caught
/// or at the end.
pub struct RevealedWhenDue;

impl<'a> Invariant<Snapshot<'a, MrWhite>> for RevealedWhenDue {
    fn holds(state: &Snapshot<'a, MrWhite>) -> bool {
        let public = state.public;
        let ended = matches!(public.phase(), MrWhitePhase::Ended { .. });
        let caught = ended || public.phase() == &MrWhitePhase::LastGuess;
        public.word().is_some() == ended && public.mr_white().is_some() == caught
    }

    fn description() -> &'static str {
        "Word and Mr White are revealed only when due"
    }
}

/// All Mr White invariants.
pub type MrWhiteInvariants = (SeatsAccountedFor, BallotsMatchVoters, RevealedWhenDue);
