//! Hangman state.

use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnCursor, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Misses allowed per round before the word owner takes it.
pub const MAX_MISTAKES: usize = 7;

/// Number of rounds; each player's word is guessed once.
pub const ROUNDS: usize = 2;

/// Mask character for unguessed letters.
pub const HIDDEN: char = '_';

/// Hangman phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HangmanPhase {
    /// Both players choose a word.
    EnterWord,
    /// One player guesses the other's word.
    Guessing {
        /// 0: seat 1 guesses seat 0's word. 1: swapped.
        round: usize,
    },
    /// Both rounds played.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for HangmanPhase {
    fn stage(&self) -> Stage {
        match self {
            HangmanPhase::EnterWord => Stage::Setup,
            HangmanPhase::Guessing { .. } => Stage::Play,
            HangmanPhase::Ended { .. } => Stage::Ended,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            HangmanPhase::EnterWord => "ENTER_WORD",
            HangmanPhase::Guessing { .. } => "GUESSING",
            HangmanPhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (HangmanPhase::EnterWord, HangmanPhase::Guessing { round: 0 })
                | (
                    HangmanPhase::Guessing { round: 0 },
                    HangmanPhase::Guessing { round: 1 }
                )
                | (
                    HangmanPhase::Guessing { round: 1 },
                    HangmanPhase::Ended { .. }
                )
        )
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            HangmanPhase::Ended { winner } => Some(winner),
            _ => None,
        }
    }
}

/// One guessed letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterEntry {
    /// Round the letter was played in.
    pub round: usize,
    /// Who guessed.
    pub guesser: PlayerId,
    /// Lowercase letter.
    pub letter: char,
    /// True if the letter is in the word.
    pub hit: bool,
}

/// Broadcast-safe hangman state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct HangmanPublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: HangmanPhase,
    #[getter(skip)]
    cursor: TurnCursor,
    word_set: BTreeMap<PlayerId, bool>,
    max_mistakes: usize,
    /// Letters guessed in the current round.
    guessed_letters: Vec<char>,
    mistakes: usize,
    /// Current word with unguessed letters masked.
    revealed_word: String,
    word_length: usize,
    round_winners: [Option<PlayerId>; ROUNDS],
    history: Vec<LetterEntry>,
    /// Both words, published once the game has ended.
    final_words: Option<BTreeMap<PlayerId, String>>,
}

impl HangmanPublic {
    pub(super) fn new(roster: Roster) -> Self {
        let word_set = roster.iter().map(|p| (p.clone(), false)).collect();
        let cursor = TurnCursor::new(roster.len());
        Self {
            roster,
            phase: HangmanPhase::EnterWord,
            cursor,
            word_set,
            max_mistakes: MAX_MISTAKES,
            guessed_letters: Vec::new(),
            mistakes: 0,
            revealed_word: String::new(),
            word_length: 0,
            round_winners: [None, None],
            history: Vec::new(),
            final_words: None,
        }
    }

    /// True once `player` has submitted a word.
    pub fn has_word(&self, player: &PlayerId) -> bool {
        self.word_set.get(player).copied().unwrap_or(false)
    }

    /// Current round, while guessing.
    pub fn round(&self) -> Option<usize> {
        match self.phase {
            HangmanPhase::Guessing { round } => Some(round),
            _ => None,
        }
    }

    /// Owner of the word guessed in `round`.
    pub fn owner_of_round(&self, round: usize) -> Option<&PlayerId> {
        self.roster.get(round)
    }

    /// Guesser in `round`.
    pub fn guesser_of_round(&self, round: usize) -> Option<&PlayerId> {
        self.roster.get((round + 1) % self.roster.len())
    }

    pub(super) fn phase_mut(&mut self) -> &mut HangmanPhase {
        &mut self.phase
    }

    pub(super) fn mark_word_set(&mut self, player: &PlayerId) {
        self.word_set.insert(player.clone(), true);
    }

    /// Clears the board for `round` against `word`.
    pub(super) fn start_round(&mut self, round: usize, word: &str) {
        self.guessed_letters.clear();
        self.mistakes = 0;
        self.word_length = word.chars().count();
        self.revealed_word = mask(word, &[]);
        self.cursor.seat((round + 1) % self.roster.len());
    }

    /// Records a letter against `word`.
    pub(super) fn guess(&mut self, entry: LetterEntry, word: &str) {
        self.guessed_letters.push(entry.letter);
        if !entry.hit {
            self.mistakes += 1;
        }
        self.revealed_word = mask(word, &self.guessed_letters);
        self.history.push(entry);
    }

    pub(super) fn set_round_winner(&mut self, round: usize, winner: PlayerId) {
        self.round_winners[round] = Some(winner);
    }

    pub(super) fn reveal(&mut self, words: BTreeMap<PlayerId, String>) {
        self.final_words = Some(words);
    }
}

/// Masks every letter of `word` not in `guessed`.
pub fn mask(word: &str, guessed: &[char]) -> String {
    word.chars()
        .map(|c| if guessed.contains(&c) { c } else { HIDDEN })
        .collect()
}

impl CommonState for HangmanPublic {
    type Phase = HangmanPhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &HangmanPhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.history.len()
    }
}

/// Server-only hangman secrets: each player's lowercase word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangmanSecrets {
    /// Words by owner.
    pub words: BTreeMap<PlayerId, String>,
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HangmanView {
    /// The public state, verbatim.
    #[serde(flatten)]
    pub public: HangmanPublic,
    /// The viewer's own word, once submitted.
    pub my_word: Option<String>,
}
