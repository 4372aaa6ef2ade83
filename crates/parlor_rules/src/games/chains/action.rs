//! Chains payloads and reports.

use super::types::ChainEntry;
use serde::{Deserialize, Serialize};

/// Setup payload: one theme word plus the chain words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainWords {
    /// Public theme word.
    pub theme: String,
    /// Exactly `chain_count` secret words.
    pub words: Vec<String>,
}

/// Move payload: a guess at one of the opponent's words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainGuess {
    /// Raw guess.
    pub word: String,
}

/// Validated, uppercased setup words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWords {
    pub(super) theme: String,
    pub(super) words: Vec<String>,
}

/// Validated guess with the resolved target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedChainGuess {
    pub(super) word: String,
    pub(super) target: crate::core::PlayerId,
    /// Index of the first unrevealed word equal to the guess.
    pub(super) matched: Option<usize>,
}

/// Result of a resolved guess or timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsReport {
    /// The logged entry.
    pub entry: ChainEntry,
    /// Index of the word a correct guess revealed.
    pub word_index: Option<usize>,
    /// Index of the word that got one more letter after a miss.
    pub hinted_index: Option<usize>,
    /// True if the guess revealed the last word.
    pub won: bool,
}
