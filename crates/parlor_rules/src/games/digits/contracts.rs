//! Digits preconditions, resolver and projection.

use super::action::{AcceptedCode, AcceptedGuess, CodeGuess, DigitsReport, SecretCode};
use super::feedback::score;
use super::invariants::DigitsInvariants;
use super::types::{
    DigitsPhase, DigitsPublic, DigitsSecrets, DigitsSettings, DigitsView, GuessEntry,
};
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, PlayerId, Roster, Snapshot, Table,
    Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// The digits variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits;

impl Digits {
    /// Creates a two-player digits table awaiting both codes.
    #[instrument(skip(players), fields(players = players.len()))]
    pub fn create(
        players: Vec<PlayerId>,
        settings: DigitsSettings,
    ) -> Result<Table<Digits>, GameError> {
        let roster = Roster::with_bounds(players, 2, Some(2))?;
        let settings = DigitsSettings::new(*settings.code_length());
        info!(code_length = settings.code_length(), "Digits game created");
        Ok(Table::fresh(
            DigitsPublic::new(roster, settings),
            DigitsSecrets::default(),
        ))
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: a string of exactly `len` ASCII digits.
pub struct WellFormedCode;

impl WellFormedCode {
    /// Returns the trimmed code.
    pub fn check<'a>(raw: &'a str, len: usize, what: &str) -> Result<&'a str, GameError> {
        let code = raw.trim();
        if code.len() != len || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GameError::invalid(format!(
                "{what} must be exactly {len} digits"
            )));
        }
        Ok(code)
    }
}

// ─────────────────────────────────────────────────────────────
//  Variant
// ─────────────────────────────────────────────────────────────

impl Variant for Digits {
    const NAME: &'static str = "digits";

    type Public = DigitsPublic;
    type Secrets = DigitsSecrets;
    type Setup = SecretCode;
    type AcceptedSetup = AcceptedCode;
    type Move = CodeGuess;
    type AcceptedMove = AcceptedGuess;
    type Report = DigitsReport;
    type View = DigitsView;

    fn check_setup(
        public: &DigitsPublic,
        _secrets: &DigitsSecrets,
        actor: &PlayerId,
        setup: &SecretCode,
    ) -> Result<AcceptedCode, GameError> {
        if public.phase() != &DigitsPhase::EnterSecret {
            return Err(wrong_phase(public.phase(), "submit_secret"));
        }
        seated_on_turn(public, actor, false)?;
        let code = WellFormedCode::check(&setup.code, *public.code_length(), "secret code")?;
        if public.has_secret(actor) {
            return Err(GameError::duplicate("secret code already submitted"));
        }
        Ok(AcceptedCode(code.to_string()))
    }

    fn resolve_setup(
        public: &mut DigitsPublic,
        secrets: &mut DigitsSecrets,
        actor: &PlayerId,
        accepted: AcceptedCode,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        secrets.codes.insert(actor.clone(), accepted.0);
        public.mark_secret_set(actor);
        debug!(player = %actor, "Secret code recorded");

        if public.roster().iter().all(|p| public.has_secret(p)) {
            transition(public.phase_mut(), DigitsPhase::Guessing)?;
            public.cursor_mut().reset();
            info!("All codes submitted, guessing starts");
        }
        Ok(())
    }

    fn check_move(
        public: &DigitsPublic,
        _secrets: &DigitsSecrets,
        actor: &PlayerId,
        action: &CodeGuess,
    ) -> Result<AcceptedGuess, GameError> {
        if public.phase() != &DigitsPhase::Guessing {
            return Err(wrong_phase(public.phase(), "guess"));
        }
        seated_on_turn(public, actor, true)?;
        let guess = WellFormedCode::check(&action.guess, *public.code_length(), "guess")?;
        let seat = public.roster().index_of(actor).unwrap_or_default();
        Ok(AcceptedGuess {
            guess: guess.to_string(),
            target_seat: (seat + 1) % public.roster().len(),
        })
    }

    fn resolve_move(
        public: &mut DigitsPublic,
        secrets: &mut DigitsSecrets,
        actor: &PlayerId,
        accepted: AcceptedGuess,
        _now: DateTime<Utc>,
    ) -> Result<DigitsReport, GameError> {
        let target = public
            .roster()
            .get(accepted.target_seat)
            .cloned()
            .ok_or_else(|| GameError::invalid("no player to target"))?;
        let secret = secrets
            .codes
            .get(&target)
            .ok_or(GameError::SecretsMissing)?;

        let feedback = score(secret, &accepted.guess);
        let solved = feedback.correct_place == *public.code_length();
        let entry = GuessEntry {
            guesser: actor.clone(),
            target,
            guess: accepted.guess,
            feedback,
        };
        debug!(
            correct_digits = feedback.correct_digits,
            correct_place = feedback.correct_place,
            "Guess scored"
        );
        public.record(entry.clone());

        if solved {
            transition(
                public.phase_mut(),
                DigitsPhase::Ended {
                    winner: Winner::Player(actor.clone()),
                },
            )?;
            public.reveal(secrets.codes.clone());
        }
        // The turn advances even after the winning guess.
        public.cursor_mut().pass();

        Ok(DigitsReport { entry, solved })
    }

    fn check_secrets(public: &DigitsPublic, secrets: &DigitsSecrets) -> Result<(), GameError> {
        for player in public.roster().iter() {
            match secrets.codes.get(player) {
                Some(code) => {
                    let trimmed =
                        WellFormedCode::check(code, *public.code_length(), "stored code")?;
                    if trimmed != code.as_str() || !public.has_secret(player) {
                        return Err(GameError::invalid(format!(
                            "stored code for {player} does not match the board"
                        )));
                    }
                }
                None if public.has_secret(player) => {
                    return Err(GameError::invalid(format!("no stored code for {player}")));
                }
                None => {}
            }
        }
        if secrets
            .codes
            .keys()
            .any(|p| public.roster().index_of(p).is_none())
        {
            return Err(GameError::invalid("stored codes for unseated players"));
        }
        Ok(())
    }

    fn project(public: &DigitsPublic, secrets: &DigitsSecrets, viewer: &PlayerId) -> DigitsView {
        DigitsView {
            public: public.clone(),
            my_code: secrets.codes.get(viewer).cloned(),
        }
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        DigitsInvariants::check_all(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameErrorKind, Stage};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn alice() -> PlayerId {
        PlayerId::from("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::from("bob")
    }

    fn ready_table() -> Table<Digits> {
        let mut table = Digits::create(vec![alice(), bob()], DigitsSettings::default()).unwrap();
        table
            .apply_setup(
                &alice(),
                SecretCode {
                    code: "1234".into(),
                },
                now(),
            )
            .unwrap();
        table
            .apply_setup(
                &bob(),
                SecretCode {
                    code: "4821".into(),
                },
                now(),
            )
            .unwrap();
        table
    }

    fn guess(
        table: &mut Table<Digits>,
        who: &PlayerId,
        digits: &str,
    ) -> Result<DigitsReport, GameError> {
        table.apply_move(
            who,
            CodeGuess {
                guess: digits.into(),
            },
            now(),
        )
    }

    #[test]
    fn test_create_requires_two_players() {
        let err = Digits::create(
            vec![alice(), bob(), PlayerId::from("carol")],
            DigitsSettings::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidRoster);
    }

    #[test]
    fn test_unsupported_code_length_falls_back() {
        assert_eq!(*DigitsSettings::new(9).code_length(), 4);
        assert_eq!(*DigitsSettings::new(6).code_length(), 6);
    }

    #[test]
    fn test_last_code_starts_play() {
        let mut table = Digits::create(vec![alice(), bob()], DigitsSettings::default()).unwrap();
        let first = table
            .apply_setup(
                &alice(),
                SecretCode {
                    code: "1234".into(),
                },
                now(),
            )
            .unwrap();
        assert!(!first.play_started);
        let second = table
            .apply_setup(
                &bob(),
                SecretCode {
                    code: "5678".into(),
                },
                now(),
            )
            .unwrap();
        assert!(second.play_started);
        assert_eq!(table.public().current_player(), Some(&alice()));
    }

    #[test]
    fn test_resubmission_is_duplicate() {
        let mut table = Digits::create(vec![alice(), bob()], DigitsSettings::default()).unwrap();
        table
            .apply_setup(
                &alice(),
                SecretCode {
                    code: "1234".into(),
                },
                now(),
            )
            .unwrap();
        let err = table
            .apply_setup(
                &alice(),
                SecretCode {
                    code: "5678".into(),
                },
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::Duplicate);
    }

    #[test]
    fn test_malformed_code_rejected() {
        let mut table = Digits::create(vec![alice(), bob()], DigitsSettings::default()).unwrap();
        for bad in ["123", "12a4", "12345"] {
            let err = table
                .apply_setup(&alice(), SecretCode { code: bad.into() }, now())
                .unwrap_err();
            assert_eq!(err.kind(), GameErrorKind::InvalidPayload, "{bad}");
        }
    }

    #[test]
    fn test_guess_scores_against_opponent() {
        let mut table = ready_table();
        let report = guess(&mut table, &alice(), "1824").unwrap();
        assert_eq!(report.entry.target, bob());
        assert_eq!(report.entry.feedback.correct_digits, 4);
        assert_eq!(report.entry.feedback.correct_place, 2);
        assert!(!report.solved);
        assert_eq!(table.public().current_player(), Some(&bob()));
    }

    #[test]
    fn test_out_of_turn_guess_rejected() {
        let mut table = ready_table();
        let err = guess(&mut table, &bob(), "1234").unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::NotYourTurn);
        assert!(table.public().guess_history().is_empty());
    }

    #[test]
    fn test_solving_ends_and_reveals() {
        let mut table = ready_table();
        let report = guess(&mut table, &alice(), "4821").unwrap();
        assert!(report.solved);
        assert!(table.is_over());
        assert_eq!(table.public().stage(), Stage::Ended);
        assert_eq!(table.winner(), Some(&Winner::Player(alice())));
        let revealed = table.public().revealed_codes().clone().unwrap();
        assert_eq!(revealed.get(&alice()).map(String::as_str), Some("1234"));

        let err = guess(&mut table, &bob(), "1234").unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::AlreadyOver);
    }

    #[test]
    fn test_view_hides_opponent_code() {
        let table = ready_table();
        let view = table.view_for(&alice());
        assert_eq!(view.my_code.as_deref(), Some("1234"));
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("4821"));
        assert!(table.view_for(&PlayerId::from("mallory")).my_code.is_none());
    }
}
