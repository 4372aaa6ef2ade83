//! Chains state.

use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnClock, TurnCursor, Winner};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain count used when none (or an unsupported one) is requested.
pub const DEFAULT_CHAIN_COUNT: usize = 5;

/// Accepted chain counts.
pub const CHAIN_COUNTS: std::ops::RangeInclusive<usize> = 3..=10;

/// Wall-clock limit of one turn.
pub const TURN_LIMIT_MS: i64 = 60_000;

/// Chains settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChainsSettings {
    #[serde(default = "default_chain_count")]
    chain_count: usize,
    #[serde(default = "default_turn_limit_ms")]
    turn_limit_ms: i64,
}

fn default_chain_count() -> usize {
    DEFAULT_CHAIN_COUNT
}

fn default_turn_limit_ms() -> i64 {
    TURN_LIMIT_MS
}

impl ChainsSettings {
    /// Settings with the given chain count, falling back to 5 outside 3-10.
    pub fn new(chain_count: usize) -> Self {
        Self::with_turn_limit(chain_count, TURN_LIMIT_MS)
    }

    /// Settings with a custom turn limit in milliseconds (at least one second).
    pub fn with_turn_limit(chain_count: usize, turn_limit_ms: i64) -> Self {
        let chain_count = if CHAIN_COUNTS.contains(&chain_count) {
            chain_count
        } else {
            DEFAULT_CHAIN_COUNT
        };
        Self {
            chain_count,
            turn_limit_ms: turn_limit_ms.max(1_000),
        }
    }
}

impl Default for ChainsSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_COUNT)
    }
}

/// Chains phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainsPhase {
    /// Both players submit a theme and their chain words.
    EnterWords,
    /// Players take turns guessing the opponent's chain.
    Guessing,
    /// A chain was fully revealed.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for ChainsPhase {
    fn stage(&self) -> Stage {
        match self {
            ChainsPhase::EnterWords => Stage::Setup,
            ChainsPhase::Guessing => Stage::Play,
            ChainsPhase::Ended { .. } => Stage::Ended,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ChainsPhase::EnterWords => "ENTER_WORDS",
            ChainsPhase::Guessing => "GUESSING",
            ChainsPhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (ChainsPhase::EnterWords, ChainsPhase::Guessing)
                | (ChainsPhase::Guessing, ChainsPhase::Ended { .. })
        )
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            ChainsPhase::Ended { winner } => Some(winner),
            _ => None,
        }
    }
}

/// Public mask of one chain word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSlot {
    /// First letter, uppercase.
    pub first_letter: char,
    /// Word length.
    pub length: usize,
    /// How many leading letters are shown, starting at 1.
    pub revealed_letters: usize,
    /// The shown prefix.
    pub shown: String,
    /// The whole word, once guessed.
    pub word: Option<String>,
}

impl ChainSlot {
    /// Mask of a freshly submitted (uppercase) word.
    pub fn masked(word: &str) -> Self {
        let shown: String = word.chars().take(1).collect();
        Self {
            first_letter: shown.chars().next().unwrap_or('?'),
            length: word.chars().count(),
            revealed_letters: 1,
            shown,
            word: None,
        }
    }

    /// True once the whole word has been guessed.
    pub fn is_revealed(&self) -> bool {
        self.word.is_some()
    }

    /// Shows one more letter of `word`, capped at its length.
    pub(super) fn hint(&mut self, word: &str) {
        self.revealed_letters = (self.revealed_letters + 1).min(self.length);
        self.shown = word.chars().take(self.revealed_letters).collect();
    }

    /// Reveals the whole word.
    pub(super) fn reveal(&mut self, word: &str) {
        self.revealed_letters = self.length;
        self.shown = word.to_string();
        self.word = Some(word.to_string());
    }
}

/// How a logged turn went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainOutcome {
    /// The guess revealed a word.
    Correct,
    /// The guess matched nothing.
    Miss,
    /// The guesser ran out of time.
    TimedOut,
}

/// One logged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Who was on turn.
    pub guesser: PlayerId,
    /// Whose chain was targeted.
    pub target: PlayerId,
    /// Uppercase guess, absent on timeout.
    pub word: Option<String>,
    /// What happened.
    pub outcome: ChainOutcome,
}

/// Broadcast-safe chains state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChainsPublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: ChainsPhase,
    #[getter(skip)]
    cursor: TurnCursor,
    chain_count: usize,
    turn_limit_ms: i64,
    words_set: BTreeMap<PlayerId, bool>,
    /// Theme words, public as soon as submitted.
    theme_words: BTreeMap<PlayerId, String>,
    /// Masked chain words per owner.
    chains: BTreeMap<PlayerId, Vec<ChainSlot>>,
    history: Vec<ChainEntry>,
    clock: Option<TurnClock>,
}

impl ChainsPublic {
    pub(super) fn new(roster: Roster, settings: ChainsSettings) -> Self {
        let words_set = roster.iter().map(|p| (p.clone(), false)).collect();
        let cursor = TurnCursor::new(roster.len());
        Self {
            roster,
            phase: ChainsPhase::EnterWords,
            cursor,
            chain_count: *settings.chain_count(),
            turn_limit_ms: *settings.turn_limit_ms(),
            words_set,
            theme_words: BTreeMap::new(),
            chains: BTreeMap::new(),
            history: Vec::new(),
            clock: None,
        }
    }

    /// True once `player` has submitted their words.
    pub fn has_words(&self, player: &PlayerId) -> bool {
        self.words_set.get(player).copied().unwrap_or(false)
    }

    /// Masked chain of `owner`.
    pub fn chain_of(&self, owner: &PlayerId) -> &[ChainSlot] {
        self.chains
            .get(owner)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of `owner`'s words not yet guessed.
    pub fn unrevealed_count(&self, owner: &PlayerId) -> usize {
        self.chain_of(owner)
            .iter()
            .filter(|s| !s.is_revealed())
            .count()
    }

    /// Time left in the running turn; pure in `now`.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.clock.as_ref().map(|c| c.remaining(now))
    }

    pub(super) fn phase_mut(&mut self) -> &mut ChainsPhase {
        &mut self.phase
    }

    pub(super) fn cursor_mut(&mut self) -> &mut TurnCursor {
        &mut self.cursor
    }

    pub(super) fn chain_mut(&mut self, owner: &PlayerId) -> Option<&mut Vec<ChainSlot>> {
        self.chains.get_mut(owner)
    }

    pub(super) fn set_words(&mut self, owner: &PlayerId, theme: String, slots: Vec<ChainSlot>) {
        self.theme_words.insert(owner.clone(), theme);
        self.chains.insert(owner.clone(), slots);
        self.words_set.insert(owner.clone(), true);
    }

    pub(super) fn record(&mut self, entry: ChainEntry) {
        self.history.push(entry);
    }

    pub(super) fn start_clock(&mut self, now: DateTime<Utc>) {
        self.clock = Some(TurnClock::start(
            now,
            TimeDelta::milliseconds(self.turn_limit_ms),
        ));
    }

    pub(super) fn stop_clock(&mut self) {
        self.clock = None;
    }
}

impl CommonState for ChainsPublic {
    type Phase = ChainsPhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &ChainsPhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.history.len()
    }
}

/// Server-only chains secrets: every player's chain words, uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsSecrets {
    /// Chain words by owner, in submission order.
    pub words: BTreeMap<PlayerId, Vec<String>>,
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsView {
    /// The public state, verbatim.
    #[serde(flatten)]
    pub public: ChainsPublic,
    /// The viewer's own chain words, once submitted.
    pub my_words: Option<Vec<String>>,
}
