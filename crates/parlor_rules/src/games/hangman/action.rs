//! Hangman payloads and reports.

use serde::{Deserialize, Serialize};

/// Setup payload: the word the opponent will guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretWord {
    /// Plain ASCII word, 2-20 letters.
    pub word: String,
}

/// Move payload: a letter. Only the first character counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterGuess {
    /// Raw input.
    pub letter: String,
}

/// Lowercased, validated word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWord(pub(super) String);

/// Lowercase `a-z` letter not yet played this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedLetter(pub(super) char);

/// Result of a resolved letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangmanReport {
    /// Round the letter was played in.
    pub round: usize,
    /// The letter.
    pub letter: char,
    /// True if the letter is in the word.
    pub hit: bool,
    /// Positions the letter uncovered.
    pub positions: Vec<usize>,
    /// Mask after the guess.
    pub revealed_word: String,
    /// Misses this round after the guess.
    pub mistakes: usize,
    /// Set when the guess decided the round.
    pub round_winner: Option<crate::core::PlayerId>,
}
