//! Digits payloads and move reports.

use super::types::GuessEntry;
use serde::{Deserialize, Serialize};

/// Setup payload: the player's secret code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretCode {
    /// Exactly `code_length` ASCII digits.
    pub code: String,
}

/// Move payload: a guess at the opponent's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGuess {
    /// Exactly `code_length` ASCII digits.
    pub guess: String,
}

/// Validated code, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedCode(pub(super) String);

/// Validated guess, with the player whose code it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedGuess {
    pub(super) guess: String,
    pub(super) target_seat: usize,
}

/// Result of a resolved guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitsReport {
    /// The logged entry.
    pub entry: GuessEntry,
    /// True if the guess cracked the code and ended the game.
    pub solved: bool,
}
