//! Hangman invariants.

use super::contracts::Hangman;
use super::types::mask;
use crate::core::{CommonState, Invariant, Snapshot, Stage};

/// Invariant: a round never records more misses than the budget.
pub struct MistakesWithinBudget;

impl<'a> Invariant<Snapshot<'a, Hangman>> for MistakesWithinBudget {
    fn holds(state: &Snapshot<'a, Hangman>) -> bool {
        state.public.mistakes() <= state.public.max_mistakes()
    }

    fn description() -> &'static str {
        "Mistakes never exceed the budget"
    }
}

/// Invariant: while guessing, the mask is the current word under the
/// guessed letters.
pub struct MaskMatchesWord;

impl<'a> Invariant<Snapshot<'a, Hangman>> for MaskMatchesWord {
    fn holds(state: &Snapshot<'a, Hangman>) -> bool {
        let Some(round) = state.public.round() else {
            return true;
        };
        state
            .public
            .owner_of_round(round)
            .and_then(|owner| state.secrets.words.get(owner))
            .is_some_and(|word| {
                mask(word, state.public.guessed_letters()) == *state.public.revealed_word()
            })
    }

    fn description() -> &'static str {
        "Revealed word matches the secret under the guessed letters"
    }
}

/// Invariant: words are published exactly when the game has ended.
pub struct WordsOnlyWhenEnded;

impl<'a> Invariant<Snapshot<'a, Hangman>> for WordsOnlyWhenEnded {
    fn holds(state: &Snapshot<'a, Hangman>) -> bool {
        state.public.final_words().is_some() == (state.public.stage() == Stage::Ended)
    }

    fn description() -> &'static str {
        "Hangman words are revealed exactly at the end"
    }
}

/// All hangman invariants.
pub type HangmanInvariants = (MistakesWithinBudget, MaskMatchesWord, WordsOnlyWhenEnded);
