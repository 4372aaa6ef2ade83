//! Motus payloads and reports.

use super::types::AttemptRow;
use serde::{Deserialize, Serialize};

/// Move payload: a word guess, normalized before checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGuess {
    /// Raw guess as typed.
    pub word: String,
}

/// Canonical guess that passed the length and first-letter checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWord(pub(super) String);

impl AcceptedWord {
    /// The canonical word.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a resolved guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotusReport {
    /// The colored row appended to the board.
    pub row: AttemptRow,
    /// True if the guess matched the target.
    pub solved: bool,
    /// True if the budget ran out without a match.
    pub exhausted: bool,
}
