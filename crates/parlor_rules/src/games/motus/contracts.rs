//! Motus preconditions, resolver and projection.

use super::action::{AcceptedWord, MotusReport, WordGuess};
use super::coloring::color;
use super::invariants::MotusInvariants;
use super::types::{AttemptRow, MotusPhase, MotusPublic, MotusSecrets, MotusSettings};
use crate::core::text::{MIN_WORD_LEN, canonical};
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, NoSetup, PlayerId, Roster, Snapshot,
    Table, Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// The motus variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motus;

impl Motus {
    /// Creates a motus table around a sourced target word.
    ///
    /// The word is canonicalized; if nothing usable is left the source is
    /// reported unavailable and no table is created.
    #[instrument(skip(players, word), fields(players = players.len()))]
    pub fn create(
        players: Vec<PlayerId>,
        settings: MotusSettings,
        word: &str,
    ) -> Result<Table<Motus>, GameError> {
        let roster = Roster::with_bounds(players, 2, None)?;
        let target = canonical(word);
        if target.chars().count() < MIN_WORD_LEN {
            warn!(raw_len = word.len(), "Sourced word unusable");
            return Err(GameError::SourceUnavailable {
                reason: format!("sourced word {word:?} has no usable letters"),
            });
        }
        let settings = MotusSettings::new(*settings.max_attempts());
        info!(
            word_length = target.chars().count(),
            max_attempts = settings.max_attempts(),
            "Motus game created"
        );
        Ok(Table::fresh(
            MotusPublic::new(roster, settings, &target),
            MotusSecrets {
                target: Some(target),
            },
        ))
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the canonical guess has the target's length and starts
/// with the revealed first letter.
pub struct FitsTheBoard;

impl FitsTheBoard {
    /// Returns the canonical guess.
    pub fn check(public: &MotusPublic, raw: &str) -> Result<String, GameError> {
        let guess = canonical(raw);
        if guess.chars().count() != *public.word_length() {
            return Err(GameError::invalid(format!(
                "guess must be exactly {} letters",
                public.word_length()
            )));
        }
        if !guess.starts_with(*public.first_letter()) {
            return Err(GameError::invalid(format!(
                "guess must start with {:?}",
                public.first_letter()
            )));
        }
        Ok(guess)
    }
}

// ─────────────────────────────────────────────────────────────
//  Variant
// ─────────────────────────────────────────────────────────────

impl Variant for Motus {
    const NAME: &'static str = "motus";

    type Public = MotusPublic;
    type Secrets = MotusSecrets;
    type Setup = NoSetup;
    type AcceptedSetup = NoSetup;
    type Move = WordGuess;
    type AcceptedMove = AcceptedWord;
    type Report = MotusReport;
    type View = MotusPublic;

    fn check_setup(
        _public: &MotusPublic,
        _secrets: &MotusSecrets,
        _actor: &PlayerId,
        setup: &NoSetup,
    ) -> Result<NoSetup, GameError> {
        match *setup {}
    }

    fn resolve_setup(
        _public: &mut MotusPublic,
        _secrets: &mut MotusSecrets,
        _actor: &PlayerId,
        accepted: NoSetup,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        match accepted {}
    }

    fn check_move(
        public: &MotusPublic,
        _secrets: &MotusSecrets,
        actor: &PlayerId,
        action: &WordGuess,
    ) -> Result<AcceptedWord, GameError> {
        if public.phase() != &MotusPhase::Guessing {
            return Err(wrong_phase(public.phase(), "guess"));
        }
        seated_on_turn(public, actor, true)?;
        FitsTheBoard::check(public, &action.word).map(AcceptedWord)
    }

    fn resolve_move(
        public: &mut MotusPublic,
        secrets: &mut MotusSecrets,
        actor: &PlayerId,
        accepted: AcceptedWord,
        _now: DateTime<Utc>,
    ) -> Result<MotusReport, GameError> {
        let target = secrets.target.clone().ok_or(GameError::SecretsMissing)?;
        let row = AttemptRow {
            player: actor.clone(),
            letters: color(&target, accepted.as_str()),
        };
        public.record(row.clone());

        let solved = accepted.as_str() == target;
        let exhausted = !solved && public.attempts_left() == 0;
        debug!(
            solved,
            attempts_left = public.attempts_left(),
            "Attempt colored"
        );

        if solved {
            transition(
                public.phase_mut(),
                MotusPhase::Ended {
                    winner: Winner::Player(actor.clone()),
                },
            )?;
            public.reveal(target);
        } else if exhausted {
            transition(
                public.phase_mut(),
                MotusPhase::Ended {
                    winner: Winner::Tie,
                },
            )?;
            public.reveal(target);
        } else {
            public.cursor_mut().pass();
        }

        Ok(MotusReport {
            row,
            solved,
            exhausted,
        })
    }

    fn check_secrets(public: &MotusPublic, secrets: &MotusSecrets) -> Result<(), GameError> {
        match &secrets.target {
            Some(target)
                if target.chars().count() != *public.word_length()
                    || !target.starts_with(*public.first_letter()) =>
            {
                Err(GameError::invalid("stored target does not fit the board"))
            }
            _ => Ok(()),
        }
    }

    fn project(public: &MotusPublic, _secrets: &MotusSecrets, _viewer: &PlayerId) -> MotusPublic {
        public.clone()
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        MotusInvariants::check_all(state)
    }
}
