//! Hangman preconditions, resolver and projection.

use super::action::{AcceptedLetter, AcceptedWord, HangmanReport, LetterGuess, SecretWord};
use super::invariants::HangmanInvariants;
use super::types::{
    HIDDEN, HangmanPhase, HangmanPublic, HangmanSecrets, HangmanView, LetterEntry, ROUNDS,
};
use crate::core::text::plain_word;
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, PlayerId, Roster, Snapshot, Table,
    Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// The hangman variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hangman;

impl Hangman {
    /// Creates a two-player hangman table awaiting both words.
    #[instrument(skip(players), fields(players = players.len()))]
    pub fn create(players: Vec<PlayerId>) -> Result<Table<Hangman>, GameError> {
        let roster = Roster::with_bounds(players, 2, Some(2))?;
        info!("Hangman game created");
        Ok(Table::fresh(
            HangmanPublic::new(roster),
            HangmanSecrets::default(),
        ))
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the first character of the input is a letter `a-z`.
pub struct SingleLetter;

impl SingleLetter {
    /// Returns the lowercased letter.
    pub fn check(raw: &str) -> Result<char, GameError> {
        raw.chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .filter(char::is_ascii_lowercase)
            .ok_or_else(|| GameError::invalid("guess a single letter a-z"))
    }
}

/// Overall winner from the two round winners.
fn overall(round_winners: &[Option<PlayerId>; ROUNDS]) -> Winner {
    match round_winners {
        [Some(a), Some(b)] if a == b => Winner::Player(a.clone()),
        _ => Winner::Tie,
    }
}

// ─────────────────────────────────────────────────────────────
//  Variant
// ─────────────────────────────────────────────────────────────

impl Variant for Hangman {
    const NAME: &'static str = "hangman";

    type Public = HangmanPublic;
    type Secrets = HangmanSecrets;
    type Setup = SecretWord;
    type AcceptedSetup = AcceptedWord;
    type Move = LetterGuess;
    type AcceptedMove = AcceptedLetter;
    type Report = HangmanReport;
    type View = HangmanView;

    fn check_setup(
        public: &HangmanPublic,
        _secrets: &HangmanSecrets,
        actor: &PlayerId,
        setup: &SecretWord,
    ) -> Result<AcceptedWord, GameError> {
        if public.phase() != &HangmanPhase::EnterWord {
            return Err(wrong_phase(public.phase(), "set_word"));
        }
        seated_on_turn(public, actor, false)?;
        let word = plain_word(&setup.word, "word")?.to_ascii_lowercase();
        if public.has_word(actor) {
            return Err(GameError::duplicate("word already submitted"));
        }
        Ok(AcceptedWord(word))
    }

    fn resolve_setup(
        public: &mut HangmanPublic,
        secrets: &mut HangmanSecrets,
        actor: &PlayerId,
        accepted: AcceptedWord,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        secrets.words.insert(actor.clone(), accepted.0);
        public.mark_word_set(actor);
        debug!(player = %actor, "Word recorded");

        if public.roster().iter().all(|p| public.has_word(p)) {
            let owner = public
                .owner_of_round(0)
                .cloned()
                .ok_or_else(|| GameError::invalid("no owner for round 0"))?;
            let word = secrets.words.get(&owner).ok_or(GameError::SecretsMissing)?;
            transition(public.phase_mut(), HangmanPhase::Guessing { round: 0 })?;
            public.start_round(0, word);
            info!("Both words submitted, round 0 starts");
        }
        Ok(())
    }

    fn check_move(
        public: &HangmanPublic,
        _secrets: &HangmanSecrets,
        actor: &PlayerId,
        action: &LetterGuess,
    ) -> Result<AcceptedLetter, GameError> {
        if public.round().is_none() {
            return Err(wrong_phase(public.phase(), "guess_letter"));
        }
        seated_on_turn(public, actor, true)?;
        let letter = SingleLetter::check(&action.letter)?;
        if public.guessed_letters().contains(&letter) {
            return Err(GameError::duplicate(format!(
                "letter {letter:?} already guessed"
            )));
        }
        Ok(AcceptedLetter(letter))
    }

    fn resolve_move(
        public: &mut HangmanPublic,
        secrets: &mut HangmanSecrets,
        actor: &PlayerId,
        accepted: AcceptedLetter,
        _now: DateTime<Utc>,
    ) -> Result<HangmanReport, GameError> {
        let round = public
            .round()
            .ok_or_else(|| GameError::invalid("no round in progress"))?;
        let owner = public
            .owner_of_round(round)
            .cloned()
            .ok_or_else(|| GameError::invalid("no owner for round"))?;
        let word = secrets
            .words
            .get(&owner)
            .cloned()
            .ok_or(GameError::SecretsMissing)?;

        let letter = accepted.0;
        let positions: Vec<usize> = word
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == letter)
            .map(|(i, _)| i)
            .collect();
        let hit = !positions.is_empty();
        public.guess(
            LetterEntry {
                round,
                guesser: actor.clone(),
                letter,
                hit,
            },
            &word,
        );
        let revealed_word = public.revealed_word().clone();
        let mistakes = *public.mistakes();
        debug!(%letter, hit, mistakes, "Letter resolved");

        let round_winner = if !revealed_word.contains(HIDDEN) {
            Some(actor.clone())
        } else if mistakes >= *public.max_mistakes() {
            Some(owner)
        } else {
            None
        };

        if let Some(winner) = &round_winner {
            public.set_round_winner(round, winner.clone());
            info!(round, winner = %winner, "Round decided");
            if round + 1 < ROUNDS {
                let next_owner = public
                    .owner_of_round(round + 1)
                    .cloned()
                    .ok_or_else(|| GameError::invalid("no owner for next round"))?;
                let next_word = secrets
                    .words
                    .get(&next_owner)
                    .ok_or(GameError::SecretsMissing)?;
                transition(
                    public.phase_mut(),
                    HangmanPhase::Guessing { round: round + 1 },
                )?;
                public.start_round(round + 1, next_word);
            } else {
                let winner = overall(public.round_winners());
                transition(public.phase_mut(), HangmanPhase::Ended { winner })?;
                public.reveal(secrets.words.clone());
            }
        }

        Ok(HangmanReport {
            round,
            letter,
            hit,
            positions,
            revealed_word,
            mistakes,
            round_winner,
        })
    }

    fn project(public: &HangmanPublic, secrets: &HangmanSecrets, viewer: &PlayerId) -> HangmanView {
        HangmanView {
            public: public.clone(),
            my_word: secrets.words.get(viewer).cloned(),
        }
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        HangmanInvariants::check_all(state)
    }
}
