//! Digits state: settings, phase, public board and secrets.

use super::feedback::Feedback;
use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnCursor, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Code length used when none (or an unsupported one) is requested.
pub const DEFAULT_CODE_LENGTH: usize = 4;

/// Accepted code lengths.
pub const CODE_LENGTHS: std::ops::RangeInclusive<usize> = 4..=6;

/// Digits settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct DigitsSettings {
    #[serde(default = "default_code_length")]
    code_length: usize,
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

impl DigitsSettings {
    /// Settings with the given code length, falling back to the default
    /// when it lies outside 4-6.
    pub fn new(code_length: usize) -> Self {
        let code_length = if CODE_LENGTHS.contains(&code_length) {
            code_length
        } else {
            DEFAULT_CODE_LENGTH
        };
        Self { code_length }
    }
}

impl Default for DigitsSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

/// Digits phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigitsPhase {
    /// Both players choose their code.
    EnterSecret,
    /// Players alternate guessing each other's code.
    Guessing,
    /// Somebody cracked a code.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for DigitsPhase {
    fn stage(&self) -> Stage {
        match self {
            DigitsPhase::EnterSecret => Stage::Setup,
            DigitsPhase::Guessing => Stage::Play,
            DigitsPhase::Ended { .. } => Stage::Ended,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DigitsPhase::EnterSecret => "ENTER_SECRET",
            DigitsPhase::Guessing => "GUESSING",
            DigitsPhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (DigitsPhase::EnterSecret, DigitsPhase::Guessing)
                | (DigitsPhase::Guessing, DigitsPhase::Ended { .. })
        )
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            DigitsPhase::Ended { winner } => Some(winner),
            _ => None,
        }
    }
}

/// One scored guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessEntry {
    /// Who guessed.
    pub guesser: PlayerId,
    /// Whose code was guessed.
    pub target: PlayerId,
    /// The guessed digits.
    pub guess: String,
    /// Score against the target's code.
    #[serde(flatten)]
    pub feedback: Feedback,
}

/// Broadcast-safe digits state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct DigitsPublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: DigitsPhase,
    code_length: usize,
    /// Who has submitted a code, never the code itself.
    secret_set: BTreeMap<PlayerId, bool>,
    guess_history: Vec<GuessEntry>,
    #[getter(skip)]
    cursor: TurnCursor,
    /// Both codes, published once the game has ended.
    revealed_codes: Option<BTreeMap<PlayerId, String>>,
}

impl DigitsPublic {
    pub(super) fn new(roster: Roster, settings: DigitsSettings) -> Self {
        let secret_set = roster.iter().map(|p| (p.clone(), false)).collect();
        let cursor = TurnCursor::new(roster.len());
        Self {
            roster,
            phase: DigitsPhase::EnterSecret,
            code_length: *settings.code_length(),
            secret_set,
            guess_history: Vec::new(),
            cursor,
            revealed_codes: None,
        }
    }

    /// True once `player` has submitted a code.
    pub fn has_secret(&self, player: &PlayerId) -> bool {
        self.secret_set.get(player).copied().unwrap_or(false)
    }

    pub(super) fn phase_mut(&mut self) -> &mut DigitsPhase {
        &mut self.phase
    }

    pub(super) fn mark_secret_set(&mut self, player: &PlayerId) {
        self.secret_set.insert(player.clone(), true);
    }

    pub(super) fn cursor_mut(&mut self) -> &mut TurnCursor {
        &mut self.cursor
    }

    pub(super) fn record(&mut self, entry: GuessEntry) {
        self.guess_history.push(entry);
    }

    pub(super) fn reveal(&mut self, codes: BTreeMap<PlayerId, String>) {
        self.revealed_codes = Some(codes);
    }
}

impl CommonState for DigitsPublic {
    type Phase = DigitsPhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &DigitsPhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.guess_history.len()
    }
}

/// Server-only digits secrets: each player's code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitsSecrets {
    /// Codes by owner.
    pub codes: BTreeMap<PlayerId, String>,
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitsView {
    /// The public state, verbatim.
    #[serde(flatten)]
    pub public: DigitsPublic,
    /// The viewer's own code, once submitted.
    pub my_code: Option<String>,
}
