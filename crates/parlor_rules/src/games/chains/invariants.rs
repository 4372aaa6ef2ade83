//! Chains invariants.

use super::contracts::Chains;
use super::types::ChainsPhase;
use crate::core::{CommonState, Invariant, Snapshot, Winner};

/// Invariant: every submitted chain has `chain_count` slots matching the
/// stored words in first letter and length.
pub struct MasksMatchWords;

impl<'a> Invariant<Snapshot<'a, Chains>> for MasksMatchWords {
    fn holds(state: &Snapshot<'a, Chains>) -> bool {
        state.secrets.words.iter().all(|(owner, words)| {
            let slots = state.public.chain_of(owner);
            slots.len() == *state.public.chain_count()
                && words.len() == slots.len()
                && words.iter().zip(slots).all(|(w, s)| {
                    w.chars().next() == Some(s.first_letter) && w.chars().count() == s.length
                })
        })
    }

    fn description() -> &'static str {
        "Chain masks match the stored words"
    }
}

/// Invariant: shown prefixes are real prefixes of between 1 letter and the
/// whole word.
pub struct PrefixesConsistent;

impl<'a> Invariant<Snapshot<'a, Chains>> for PrefixesConsistent {
    fn holds(state: &Snapshot<'a, Chains>) -> bool {
        state.secrets.words.iter().all(|(owner, words)| {
            words
                .iter()
                .zip(state.public.chain_of(owner))
                .all(|(w, s)| {
                    (1..=s.length).contains(&s.revealed_letters)
                        && s.shown.chars().count() == s.revealed_letters
                        && w.starts_with(&s.shown)
                        && s.word.as_ref().is_none_or(|revealed| revealed == w)
                })
        })
    }

    fn description() -> &'static str {
        "Revealed prefixes are consistent with the secret words"
    }
}

/// Invariant: the winner has revealed the opponent's whole chain.
pub struct WinnerRevealedChain;

impl<'a> Invariant<Snapshot<'a, Chains>> for WinnerRevealedChain {
    fn holds(state: &Snapshot<'a, Chains>) -> bool {
        match state.public.phase() {
            ChainsPhase::Ended {
                winner: Winner::Player(winner),
            } => state
                .public
                .roster()
                .opponent_of(winner)
                .is_some_and(|loser| state.public.unrevealed_count(loser) == 0),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "Chains winner revealed every opponent word"
    }
}

/// All chains invariants.
pub type ChainsInvariants = (MasksMatchWords, PrefixesConsistent, WinnerRevealedChain);
