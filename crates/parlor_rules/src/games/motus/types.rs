//! Motus state.

use super::coloring::LetterResult;
use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnCursor, Winner};
use serde::{Deserialize, Serialize};

/// Attempt budget shared by all players.
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

/// Motus settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct MotusSettings {
    #[serde(default = "default_max_attempts")]
    max_attempts: usize,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl MotusSettings {
    /// Settings with the given attempt budget (at least one).
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for MotusSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// Motus phases. There is no setup: the target comes from a word source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotusPhase {
    /// Players take turns guessing.
    Guessing,
    /// Found, or the budget ran out.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for MotusPhase {
    fn stage(&self) -> Stage {
        match self {
            MotusPhase::Guessing => Stage::Play,
            MotusPhase::Ended { .. } => Stage::Ended,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MotusPhase::Guessing => "GUESSING",
            MotusPhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (MotusPhase::Guessing, MotusPhase::Ended { .. })
        )
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            MotusPhase::Ended { winner } => Some(winner),
            MotusPhase::Guessing => None,
        }
    }
}

/// One colored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRow {
    /// Who guessed.
    pub player: PlayerId,
    /// Per-letter colors.
    pub letters: Vec<LetterResult>,
}

impl AttemptRow {
    /// The guessed word.
    pub fn word(&self) -> String {
        self.letters.iter().map(|l| l.letter).collect()
    }
}

/// Broadcast-safe motus state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct MotusPublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: MotusPhase,
    #[getter(skip)]
    cursor: TurnCursor,
    word_length: usize,
    first_letter: char,
    max_attempts: usize,
    attempts: Vec<AttemptRow>,
    /// The target, published once the game has ended.
    final_word: Option<String>,
}

impl MotusPublic {
    pub(super) fn new(roster: Roster, settings: MotusSettings, target: &str) -> Self {
        let cursor = TurnCursor::new(roster.len());
        Self {
            roster,
            phase: MotusPhase::Guessing,
            cursor,
            word_length: target.chars().count(),
            first_letter: target.chars().next().unwrap_or('A'),
            max_attempts: *settings.max_attempts(),
            attempts: Vec::new(),
            final_word: None,
        }
    }

    /// Attempts left before the game ends in a tie.
    pub fn attempts_left(&self) -> usize {
        self.max_attempts.saturating_sub(self.attempts.len())
    }

    pub(super) fn phase_mut(&mut self) -> &mut MotusPhase {
        &mut self.phase
    }

    pub(super) fn cursor_mut(&mut self) -> &mut TurnCursor {
        &mut self.cursor
    }

    pub(super) fn record(&mut self, row: AttemptRow) {
        self.attempts.push(row);
    }

    pub(super) fn reveal(&mut self, word: String) {
        self.final_word = Some(word);
    }
}

impl CommonState for MotusPublic {
    type Phase = MotusPhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &MotusPhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.attempts.len()
    }
}

/// Server-only motus secret: the canonical target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotusSecrets {
    /// Canonical uppercase target word.
    pub target: Option<String>,
}
