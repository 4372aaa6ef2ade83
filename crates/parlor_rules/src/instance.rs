//! One live game of any variant.
//!
//! [`GameInstance`] is the caller-facing sum type: it wraps a [`Table`] per
//! variant and routes serde-tagged payloads to the matching one. Every
//! payload, state, view, report and secret store is tagged by `game`, so a
//! payload for the wrong variant is refused before any rule runs.

use crate::core::{CommonState, GameError, PlayerId, SetupOutcome, Table, Winner, wrong_phase};
use crate::games::chains::{
    ChainGuess, ChainWords, Chains, ChainsPublic, ChainsReport, ChainsSecrets, ChainsSettings,
    ChainsView,
};
use crate::games::digits::{
    CodeGuess, Digits, DigitsPublic, DigitsReport, DigitsSecrets, DigitsSettings, DigitsView,
    SecretCode,
};
use crate::games::hangman::{
    Hangman, HangmanPublic, HangmanReport, HangmanSecrets, HangmanView, LetterGuess, SecretWord,
};
use crate::games::motus::{
    Motus, MotusPublic, MotusReport, MotusSecrets, MotusSettings, WordGuess,
};
use crate::games::mr_white::{
    MrWhite, MrWhiteMove, MrWhitePublic, MrWhiteReport, MrWhiteSecrets, MrWhiteView,
};
use crate::games::sea_battle::{
    FleetPlacement, SeaBattle, SeaBattlePublic, SeaBattleSecrets, SeaBattleView, Shot, ShotReport,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// A word fetched from a word source, with its length in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct SourcedWord {
    /// The raw word as the source returned it.
    pub word: String,
    /// Length in characters.
    pub length: usize,
}

impl SourcedWord {
    /// Wraps a word, measuring its length.
    pub fn from_word(word: impl Into<String>) -> Self {
        let word = word.into();
        let length = word.chars().count();
        Self { word, length }
    }
}

/// Creation settings, one case per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumDiscriminants)]
#[serde(tag = "game", rename_all = "snake_case")]
#[strum_discriminants(name(GameKind))]
#[strum_discriminants(derive(
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter
))]
#[strum_discriminants(serde(rename_all = "snake_case"))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum Settings {
    /// Digit-code duel.
    Digits(DigitsSettings),
    /// Shared-target word game.
    Motus(MotusSettings),
    /// Word chains.
    Chains(ChainsSettings),
    /// Two-round hangman.
    Hangman,
    /// Sea battle.
    SeaBattle,
    /// Mr White.
    MrWhite,
}

impl Settings {
    /// True if creation needs a sourced word.
    pub fn needs_vocabulary(&self) -> bool {
        matches!(self, Settings::Motus(_) | Settings::MrWhite)
    }

    /// Which variant these settings create.
    pub fn kind(&self) -> GameKind {
        GameKind::from(self)
    }
}

/// Secret submission, for variants with a setup phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum SetupPayload {
    /// Secret code.
    Digits(SecretCode),
    /// Theme and chain words.
    Chains(ChainWords),
    /// Secret word.
    Hangman(SecretWord),
    /// Fleet layout.
    SeaBattle(FleetPlacement),
}

/// A move, one case per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum Move {
    /// Code guess.
    Digits(CodeGuess),
    /// Word guess.
    Motus(WordGuess),
    /// Chain guess.
    Chains(ChainGuess),
    /// Letter guess.
    Hangman(LetterGuess),
    /// Shot.
    SeaBattle(Shot),
    /// Clue, vote, or last guess.
    MrWhite(MrWhiteMove),
}

/// Result of a resolved move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum MoveReport {
    /// Digits feedback.
    Digits(DigitsReport),
    /// Colored attempt.
    Motus(MotusReport),
    /// Chain guess or timeout.
    Chains(ChainsReport),
    /// Letter outcome.
    Hangman(HangmanReport),
    /// Shot outcome.
    SeaBattle(ShotReport),
    /// Mr White step.
    MrWhite(MrWhiteReport),
}

/// Broadcast-safe state of any variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum PublicState {
    /// Digits.
    Digits(DigitsPublic),
    /// Motus.
    Motus(MotusPublic),
    /// Chains.
    Chains(ChainsPublic),
    /// Hangman.
    Hangman(HangmanPublic),
    /// Sea battle.
    SeaBattle(SeaBattlePublic),
    /// Mr White.
    MrWhite(MrWhitePublic),
}

/// One player's projection of any variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum View {
    /// Digits.
    Digits(DigitsView),
    /// Motus.
    Motus(MotusPublic),
    /// Chains.
    Chains(ChainsView),
    /// Hangman.
    Hangman(HangmanView),
    /// Sea battle.
    SeaBattle(SeaBattleView),
    /// Mr White.
    MrWhite(MrWhiteView),
}

/// Secrets of any variant, for the caller's vault only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum SecretStore {
    /// Digits codes.
    Digits(DigitsSecrets),
    /// Motus target.
    Motus(MotusSecrets),
    /// Chain words.
    Chains(ChainsSecrets),
    /// Hangman words.
    Hangman(HangmanSecrets),
    /// Fleets.
    SeaBattle(SeaBattleSecrets),
    /// Word, Mr White, running ballots.
    MrWhite(MrWhiteSecrets),
}

/// A live game of any variant.
#[derive(Debug, Clone)]
pub enum GameInstance {
    /// Digits.
    Digits(Table<Digits>),
    /// Motus.
    Motus(Table<Motus>),
    /// Chains.
    Chains(Table<Chains>),
    /// Hangman.
    Hangman(Table<Hangman>),
    /// Sea battle.
    SeaBattle(Table<SeaBattle>),
    /// Mr White.
    MrWhite(Table<MrWhite>),
}

/// Runs `$body` against whichever table is inside `$instance`.
macro_rules! each_table {
    ($instance:expr, $table:ident => $body:expr) => {
        match $instance {
            GameInstance::Digits($table) => $body,
            GameInstance::Motus($table) => $body,
            GameInstance::Chains($table) => $body,
            GameInstance::Hangman($table) => $body,
            GameInstance::SeaBattle($table) => $body,
            GameInstance::MrWhite($table) => $body,
        }
    };
}

fn mismatch(expected: GameKind, got: &'static str) -> GameError {
    GameError::invalid(format!("{got} payload sent to a {expected} game"))
}

fn vocabulary_word(vocabulary: Option<&SourcedWord>) -> Result<&str, GameError> {
    vocabulary
        .map(|v| v.word.as_str())
        .ok_or_else(|| GameError::SourceUnavailable {
            reason: "no word was sourced".to_string(),
        })
}

impl GameInstance {
    /// Creates a game. `vocabulary` is required when
    /// [`Settings::needs_vocabulary`]; `rng` drives any random assignment.
    #[instrument(skip(players, vocabulary, rng), fields(game = %settings.kind(), players = players.len()))]
    pub fn create(
        players: Vec<PlayerId>,
        settings: Settings,
        vocabulary: Option<&SourcedWord>,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let instance = match settings {
            Settings::Digits(s) => GameInstance::Digits(Digits::create(players, s)?),
            Settings::Motus(s) => {
                GameInstance::Motus(Motus::create(players, s, vocabulary_word(vocabulary)?)?)
            }
            Settings::Chains(s) => GameInstance::Chains(Chains::create(players, s)?),
            Settings::Hangman => GameInstance::Hangman(Hangman::create(players)?),
            Settings::SeaBattle => GameInstance::SeaBattle(SeaBattle::create(players)?),
            Settings::MrWhite => {
                GameInstance::MrWhite(MrWhite::create(players, vocabulary_word(vocabulary)?, rng)?)
            }
        };
        info!(created_at = %now, "Game instance created");
        Ok(instance)
    }

    /// Which variant this is.
    pub fn kind(&self) -> GameKind {
        match self {
            GameInstance::Digits(_) => GameKind::Digits,
            GameInstance::Motus(_) => GameKind::Motus,
            GameInstance::Chains(_) => GameKind::Chains,
            GameInstance::Hangman(_) => GameKind::Hangman,
            GameInstance::SeaBattle(_) => GameKind::SeaBattle,
            GameInstance::MrWhite(_) => GameKind::MrWhite,
        }
    }

    /// Routes a secret submission to the variant.
    pub fn apply_setup(
        &mut self,
        player: &PlayerId,
        payload: SetupPayload,
        now: DateTime<Utc>,
    ) -> Result<SetupOutcome, GameError> {
        let kind = self.kind();
        match (self, payload) {
            (GameInstance::Digits(t), SetupPayload::Digits(p)) => t.apply_setup(player, p, now),
            (GameInstance::Chains(t), SetupPayload::Chains(p)) => t.apply_setup(player, p, now),
            (GameInstance::Hangman(t), SetupPayload::Hangman(p)) => t.apply_setup(player, p, now),
            (GameInstance::SeaBattle(t), SetupPayload::SeaBattle(p)) => {
                t.apply_setup(player, p, now)
            }
            (GameInstance::Motus(t), _) => Err(wrong_phase(t.public().phase(), "setup")),
            (GameInstance::MrWhite(t), _) => Err(wrong_phase(t.public().phase(), "setup")),
            (_, payload) => {
                warn!(%kind, "Setup payload for another game");
                Err(mismatch(kind, setup_name(&payload)))
            }
        }
    }

    /// Routes a move to the variant.
    pub fn apply_move(
        &mut self,
        player: &PlayerId,
        action: Move,
        now: DateTime<Utc>,
    ) -> Result<MoveReport, GameError> {
        let kind = self.kind();
        match (self, action) {
            (GameInstance::Digits(t), Move::Digits(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (GameInstance::Motus(t), Move::Motus(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (GameInstance::Chains(t), Move::Chains(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (GameInstance::Hangman(t), Move::Hangman(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (GameInstance::SeaBattle(t), Move::SeaBattle(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (GameInstance::MrWhite(t), Move::MrWhite(m)) => {
                t.apply_move(player, m, now).map(Into::into)
            }
            (_, action) => {
                warn!(%kind, "Move for another game");
                Err(mismatch(kind, move_name(&action)))
            }
        }
    }

    /// Forces a pass once the running turn's deadline has passed. Only
    /// chains has turn deadlines.
    pub fn expire_turn(&mut self, now: DateTime<Utc>) -> Result<MoveReport, GameError> {
        match self {
            GameInstance::Chains(t) => t.expire_turn(now).map(Into::into),
            other => each_table!(other, t => Err(wrong_phase(t.public().phase(), "expire turn"))),
        }
    }

    /// Deadline of the running turn, if the variant has one.
    pub fn turn_deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            GameInstance::Chains(t) => t.deadline(),
            _ => None,
        }
    }

    /// Broadcast-safe state.
    pub fn public_state(&self) -> PublicState {
        each_table!(self, t => t.public().clone().into())
    }

    /// Projection for one viewer.
    pub fn view_for(&self, viewer: &PlayerId) -> View {
        each_table!(self, t => t.view_for(viewer).into())
    }

    /// Seated players, in seat order.
    pub fn players(&self) -> Vec<PlayerId> {
        each_table!(self, t => t.public().roster().ids().to_vec())
    }

    /// True once ended.
    pub fn is_over(&self) -> bool {
        each_table!(self, t => t.is_over())
    }

    /// The outcome, once ended.
    pub fn winner(&self) -> Option<&Winner> {
        each_table!(self, t => t.winner())
    }

    /// Player to move, for turn-gated phases.
    pub fn current_player(&self) -> Option<&PlayerId> {
        each_table!(self, t => t.public().current_player())
    }

    /// Secrets for the caller's vault; absent after a restore until
    /// re-injected.
    pub fn secrets(&self) -> Option<SecretStore> {
        each_table!(self, t => t.secrets().cloned().map(Into::into))
    }

    /// Rebuilds an instance from persisted public state, without secrets.
    pub fn restore(public: PublicState) -> Self {
        match public {
            PublicState::Digits(p) => GameInstance::Digits(Table::restore(p)),
            PublicState::Motus(p) => GameInstance::Motus(Table::restore(p)),
            PublicState::Chains(p) => GameInstance::Chains(Table::restore(p)),
            PublicState::Hangman(p) => GameInstance::Hangman(Table::restore(p)),
            PublicState::SeaBattle(p) => GameInstance::SeaBattle(Table::restore(p)),
            PublicState::MrWhite(p) => GameInstance::MrWhite(Table::restore(p)),
        }
    }

    /// Re-attaches secrets from the vault.
    pub fn inject_secrets(&mut self, secrets: SecretStore) -> Result<(), GameError> {
        let kind = self.kind();
        match (self, secrets) {
            (GameInstance::Digits(t), SecretStore::Digits(s)) => t.inject_secrets(s),
            (GameInstance::Motus(t), SecretStore::Motus(s)) => t.inject_secrets(s),
            (GameInstance::Chains(t), SecretStore::Chains(s)) => t.inject_secrets(s),
            (GameInstance::Hangman(t), SecretStore::Hangman(s)) => t.inject_secrets(s),
            (GameInstance::SeaBattle(t), SecretStore::SeaBattle(s)) => t.inject_secrets(s),
            (GameInstance::MrWhite(t), SecretStore::MrWhite(s)) => t.inject_secrets(s),
            (_, secrets) => Err(mismatch(kind, secret_name(&secrets))),
        }
    }
}

fn setup_name(payload: &SetupPayload) -> &'static str {
    match payload {
        SetupPayload::Digits(_) => "digits",
        SetupPayload::Chains(_) => "chains",
        SetupPayload::Hangman(_) => "hangman",
        SetupPayload::SeaBattle(_) => "sea_battle",
    }
}

fn move_name(action: &Move) -> &'static str {
    match action {
        Move::Digits(_) => "digits",
        Move::Motus(_) => "motus",
        Move::Chains(_) => "chains",
        Move::Hangman(_) => "hangman",
        Move::SeaBattle(_) => "sea_battle",
        Move::MrWhite(_) => "mr_white",
    }
}

fn secret_name(secrets: &SecretStore) -> &'static str {
    match secrets {
        SecretStore::Digits(_) => "digits",
        SecretStore::Motus(_) => "motus",
        SecretStore::Chains(_) => "chains",
        SecretStore::Hangman(_) => "hangman",
        SecretStore::SeaBattle(_) => "sea_battle",
        SecretStore::MrWhite(_) => "mr_white",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameErrorKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn duo() -> Vec<PlayerId> {
        vec![PlayerId::from("ann"), PlayerId::from("ben")]
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_settings_parse_from_tagged_json() {
        let settings: Settings = serde_json::from_str(r#"{"game":"hangman"}"#).unwrap();
        assert_eq!(settings, Settings::Hangman);
        let settings: Settings = serde_json::from_str(r#"{"game":"motus"}"#).unwrap();
        assert_eq!(settings, Settings::Motus(MotusSettings::default()));
        assert!(settings.needs_vocabulary());
        assert!(!Settings::SeaBattle.needs_vocabulary());
    }

    #[test]
    fn test_missing_vocabulary_creates_nothing() {
        let err = GameInstance::create(
            duo(),
            Settings::Motus(MotusSettings::default()),
            None,
            &mut rng(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::SourceUnavailable);
    }

    #[test]
    fn test_wrong_variant_payload_is_invalid() {
        let mut game =
            GameInstance::create(duo(), Settings::Hangman, None, &mut rng(), now()).unwrap();
        let err = game
            .apply_move(
                &PlayerId::from("ann"),
                Move::SeaBattle(Shot::new(0, 0)),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
        let err = game
            .apply_setup(
                &PlayerId::from("ann"),
                SetupPayload::Digits(SecretCode {
                    code: "1234".into(),
                }),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
    }

    #[test]
    fn test_motus_refuses_setup_as_wrong_phase() {
        let word = SourcedWord::from_word("maison");
        let mut game = GameInstance::create(
            duo(),
            Settings::Motus(MotusSettings::default()),
            Some(&word),
            &mut rng(),
            now(),
        )
        .unwrap();
        let err = game
            .apply_setup(
                &PlayerId::from("ann"),
                SetupPayload::Hangman(SecretWord {
                    word: "chat".into(),
                }),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::WrongPhase);
    }

    #[test]
    fn test_public_state_never_carries_secrets() {
        let mut game = GameInstance::create(
            duo(),
            Settings::Digits(DigitsSettings::default()),
            None,
            &mut rng(),
            now(),
        )
        .unwrap();
        game.apply_setup(
            &PlayerId::from("ann"),
            SetupPayload::Digits(SecretCode {
                code: "4821".into(),
            }),
            now(),
        )
        .unwrap();
        let json = serde_json::to_string(&game.public_state()).unwrap();
        assert!(json.contains(r#""game":"digits""#));
        assert!(!json.contains("4821"));
        let ben = serde_json::to_string(&game.view_for(&PlayerId::from("ben"))).unwrap();
        assert!(!ben.contains("4821"));
    }

    #[test]
    fn test_restore_then_inject_resumes() {
        let mut game =
            GameInstance::create(duo(), Settings::Hangman, None, &mut rng(), now()).unwrap();
        game.apply_setup(
            &PlayerId::from("ann"),
            SetupPayload::Hangman(SecretWord {
                word: "chat".into(),
            }),
            now(),
        )
        .unwrap();
        let secrets = game.secrets().unwrap();
        let public: PublicState =
            serde_json::from_str(&serde_json::to_string(&game.public_state()).unwrap()).unwrap();

        let mut restored = GameInstance::restore(public);
        assert!(restored.secrets().is_none());
        let err = restored
            .apply_setup(
                &PlayerId::from("ben"),
                SetupPayload::Hangman(SecretWord {
                    word: "loup".into(),
                }),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::SecretsMissing);

        let stored: SecretStore =
            serde_json::from_str(&serde_json::to_string(&secrets).unwrap()).unwrap();
        restored.inject_secrets(stored).unwrap();
        let outcome = restored
            .apply_setup(
                &PlayerId::from("ben"),
                SetupPayload::Hangman(SecretWord {
                    word: "loup".into(),
                }),
                now(),
            )
            .unwrap();
        assert!(outcome.play_started);
    }

    #[test]
    fn test_inject_rejects_foreign_secrets() {
        let mut game =
            GameInstance::create(duo(), Settings::SeaBattle, None, &mut rng(), now()).unwrap();
        let err = game
            .inject_secrets(SecretStore::Motus(MotusSecrets::default()))
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
    }

    #[test]
    fn test_inject_refuses_codes_that_are_not_digits() {
        let mut game = GameInstance::create(
            duo(),
            Settings::Digits(DigitsSettings::default()),
            None,
            &mut rng(),
            now(),
        )
        .unwrap();
        for (player, code) in [("ann", "1234"), ("ben", "4821")] {
            game.apply_setup(
                &PlayerId::from(player),
                SetupPayload::Digits(SecretCode { code: code.into() }),
                now(),
            )
            .unwrap();
        }
        let mut restored = GameInstance::restore(game.public_state());

        for bad in ["12a4", "123", "12345"] {
            let codes = [
                (PlayerId::from("ann"), "1234".to_string()),
                (PlayerId::from("ben"), bad.to_string()),
            ];
            let err = restored
                .inject_secrets(SecretStore::Digits(DigitsSecrets {
                    codes: codes.into_iter().collect(),
                }))
                .unwrap_err();
            assert_eq!(err.kind(), GameErrorKind::InvalidPayload, "{bad}");
        }
        let err = restored
            .apply_move(
                &PlayerId::from("ann"),
                Move::Digits(CodeGuess {
                    guess: "4821".into(),
                }),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::SecretsMissing);

        restored.inject_secrets(game.secrets().unwrap()).unwrap();
        let MoveReport::Digits(report) = restored
            .apply_move(
                &PlayerId::from("ann"),
                Move::Digits(CodeGuess {
                    guess: "4821".into(),
                }),
                now(),
            )
            .unwrap()
        else {
            panic!("digits report expected");
        };
        assert!(report.solved);
    }

    #[test]
    fn test_inject_refuses_chain_of_other_length() {
        let mut game = GameInstance::create(
            duo(),
            Settings::Chains(ChainsSettings::new(3)),
            None,
            &mut rng(),
            now(),
        )
        .unwrap();
        for (player, theme, words) in [
            ("ann", "sea", ["wave", "salt", "tide"]),
            ("ben", "wood", ["tree", "leaf", "moss"]),
        ] {
            let payload = ChainWords {
                theme: theme.into(),
                words: words.iter().map(|w| w.to_string()).collect(),
            };
            game.apply_setup(
                &PlayerId::from(player),
                SetupPayload::Chains(payload),
                now(),
            )
            .unwrap();
        }
        let mut restored = GameInstance::restore(game.public_state());

        let Some(SecretStore::Chains(mut secrets)) = game.secrets() else {
            panic!("chains secrets expected");
        };
        if let Some(words) = secrets.words.get_mut(&PlayerId::from("ben")) {
            words.pop();
        }
        let err = restored
            .inject_secrets(SecretStore::Chains(secrets))
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
        assert!(restored.secrets().is_none());
    }

    #[test]
    fn test_only_chains_expires_turns() {
        let mut game =
            GameInstance::create(duo(), Settings::SeaBattle, None, &mut rng(), now()).unwrap();
        assert!(game.turn_deadline().is_none());
        assert_eq!(
            game.expire_turn(now()).unwrap_err().kind(),
            GameErrorKind::WrongPhase
        );
    }

    #[test]
    fn test_mr_white_needs_three() {
        let word = SourcedWord::from_word("pomme");
        let err = GameInstance::create(duo(), Settings::MrWhite, Some(&word), &mut rng(), now())
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidRoster);
    }
}
