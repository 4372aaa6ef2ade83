//! Motus invariants.

use super::contracts::Motus;
use crate::core::{CommonState, Invariant, Snapshot, Stage};

/// Invariant: the board never holds more rows than the budget allows.
pub struct WithinBudget;

impl<'a> Invariant<Snapshot<'a, Motus>> for WithinBudget {
    fn holds(state: &Snapshot<'a, Motus>) -> bool {
        state.public.attempts().len() <= *state.public.max_attempts()
    }

    fn description() -> &'static str {
        "Attempts never exceed the budget"
    }
}

/// Invariant: every row is as long as the target.
pub struct RowsFitTarget;

impl<'a> Invariant<Snapshot<'a, Motus>> for RowsFitTarget {
    fn holds(state: &Snapshot<'a, Motus>) -> bool {
        let len = *state.public.word_length();
        state
            .public
            .attempts()
            .iter()
            .all(|r| r.letters.len() == len)
    }

    fn description() -> &'static str {
        "Every attempt row matches the word length"
    }
}

/// Invariant: the target is published exactly when the game has ended.
pub struct FinalWordOnlyWhenEnded;

impl<'a> Invariant<Snapshot<'a, Motus>> for FinalWordOnlyWhenEnded {
    fn holds(state: &Snapshot<'a, Motus>) -> bool {
        state.public.final_word().is_some() == (state.public.stage() == Stage::Ended)
    }

    fn description() -> &'static str {
        "Target is revealed exactly at the end"
    }
}

/// All motus invariants.
pub type MotusInvariants = (WithinBudget, RowsFitTarget, FinalWordOnlyWhenEnded);
