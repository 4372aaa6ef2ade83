//! Hangman: two rounds, each player guessing the other's word one letter at
//! a time within a mistake budget.

mod action;
mod contracts;
mod invariants;
mod types;

pub use action::{AcceptedLetter, AcceptedWord, HangmanReport, LetterGuess, SecretWord};
pub use contracts::{Hangman, SingleLetter};
pub use invariants::{
    HangmanInvariants, MaskMatchesWord, MistakesWithinBudget, WordsOnlyWhenEnded,
};
pub use types::{
    HIDDEN, HangmanPhase, HangmanPublic, HangmanSecrets, HangmanView, LetterEntry, MAX_MISTAKES,
    ROUNDS, mask,
};
