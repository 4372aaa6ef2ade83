//! Digits invariants.

use super::contracts::Digits;
use super::types::DigitsPhase;
use crate::core::{CommonState, Invariant, Snapshot, Stage};

/// Invariant: a player's `secret_set` flag is true exactly when their code
/// is stored.
pub struct SecretFlagsMatch;

impl<'a> Invariant<Snapshot<'a, Digits>> for SecretFlagsMatch {
    fn holds(state: &Snapshot<'a, Digits>) -> bool {
        state
            .public
            .roster()
            .iter()
            .all(|p| state.public.has_secret(p) == state.secrets.codes.contains_key(p))
    }

    fn description() -> &'static str {
        "Secret flags match the stored codes"
    }
}

/// Invariant: codes are published only once the game has ended.
pub struct RevealedOnlyWhenEnded;

impl<'a> Invariant<Snapshot<'a, Digits>> for RevealedOnlyWhenEnded {
    fn holds(state: &Snapshot<'a, Digits>) -> bool {
        state.public.revealed_codes().is_none() || state.public.stage() == Stage::Ended
    }

    fn description() -> &'static str {
        "Codes stay hidden until the game ends"
    }
}

/// Invariant: an ended game's last guess matched every position.
pub struct WinnerCrackedCode;

impl<'a> Invariant<Snapshot<'a, Digits>> for WinnerCrackedCode {
    fn holds(state: &Snapshot<'a, Digits>) -> bool {
        match state.public.phase() {
            DigitsPhase::Ended { .. } => state
                .public
                .guess_history()
                .last()
                .is_some_and(|e| e.feedback.correct_place == *state.public.code_length()),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Digits ends only on a fully placed guess"
    }
}

/// All digits invariants.
pub type DigitsInvariants = (SecretFlagsMatch, RevealedOnlyWhenEnded, WinnerCrackedCode);
