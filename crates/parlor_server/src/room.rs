//! A game room: one game instance behind a single writer.
//!
//! The room is the only place an instance is mutated. Every mutation runs on
//! a copy, the copy's secrets are written to the vault, and only then does
//! the copy replace the live instance. A rejected move or a failed vault
//! write leaves the room exactly as it was.

use crate::lexicon::Lexicon;
use crate::vault::{SecretVault, VaultError};
use crate::words::{Language, WordSource, WordSourceError};
use chrono::{DateTime, Utc};
use derive_more::{Display, Error, From};
use parlor_rules::{
    GameError, GameErrorKind, GameInstance, Move, MoveReport, PlayerId, PublicState, SetupOutcome,
    SetupPayload, Settings, SourcedWord, View,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, instrument, warn};

/// Why a room operation failed.
#[derive(Debug, Display, Error, From)]
pub enum RoomError {
    /// The engine refused the operation.
    #[display("{_0}")]
    Game(GameError),

    /// A lexicon lookup failed.
    #[display("{_0}")]
    Words(WordSourceError),

    /// Secrets could not be stored or read.
    #[display("{_0}")]
    Vault(VaultError),

    /// Nothing has been started in this room.
    #[display("room {room} has no game")]
    #[from(skip)]
    NoGame {
        /// Room id.
        room: String,
    },

    /// A game is still being played in this room.
    #[display("room {room} already has a game in progress")]
    #[from(skip)]
    InProgress {
        /// Room id.
        room: String,
    },
}

impl RoomError {
    /// Engine error kind, when the engine was the one refusing.
    pub fn game_kind(&self) -> Option<GameErrorKind> {
        match self {
            RoomError::Game(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// What caused a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoomReport {
    /// A new game was created.
    Started,
    /// A player submitted their secret.
    Setup(SetupOutcome),
    /// A move was resolved.
    Move(MoveReport),
    /// The turn clock ran out.
    TurnExpired(MoveReport),
    /// The game was rebuilt from its public state.
    Recovered {
        /// False when the vault had nothing for this room.
        secrets_restored: bool,
    },
}

/// Everything the transport sends out after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    /// State every participant and spectator may see.
    pub public: PublicState,
    /// Each seated player's own projection.
    pub views: BTreeMap<PlayerId, View>,
    /// What happened.
    pub report: RoomReport,
}

impl Broadcast {
    fn of(game: &GameInstance, report: RoomReport) -> Self {
        Self {
            public: game.public_state(),
            views: views_of(game),
            report,
        }
    }
}

fn views_of(game: &GameInstance) -> BTreeMap<PlayerId, View> {
    game.players()
        .into_iter()
        .map(|player| {
            let view = game.view_for(&player);
            (player, view)
        })
        .collect()
}

/// Collaborators a room talks to.
#[derive(Clone, derive_new::new)]
pub struct RoomServices {
    /// Where sourced words come from.
    pub words: Arc<dyn WordSource>,
    /// Dictionary check for word guesses.
    pub lexicon: Arc<dyn Lexicon>,
    /// Secret side channel.
    pub vault: Arc<dyn SecretVault>,
    /// Language words are fetched and checked in.
    pub language: Language,
}

/// One room hosting at most one game at a time.
pub struct GameRoom {
    id: String,
    services: RoomServices,
    game: Mutex<Option<GameInstance>>,
    rng: Mutex<ChaCha8Rng>,
    changed: Notify,
}

impl std::fmt::Debug for GameRoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRoom")
            .field("id", &self.id)
            .field("language", &self.services.language)
            .finish_non_exhaustive()
    }
}

impl GameRoom {
    /// Empty room with an OS-seeded RNG.
    pub fn new(id: impl Into<String>, services: RoomServices) -> Self {
        Self::with_rng(id, services, ChaCha8Rng::from_os_rng())
    }

    /// Empty room with a deterministic RNG, for replays and tests.
    pub fn with_seed(id: impl Into<String>, services: RoomServices, seed: u64) -> Self {
        Self::with_rng(id, services, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(id: impl Into<String>, services: RoomServices, rng: ChaCha8Rng) -> Self {
        let id = id.into();
        info!(room = %id, "Room opened");
        Self {
            id,
            services,
            game: Mutex::new(None),
            rng: Mutex::new(rng),
            changed: Notify::new(),
        }
    }

    /// Room id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signalled after every change to the hosted game.
    pub(crate) fn changes(&self) -> &Notify {
        &self.changed
    }

    /// Starts a game, fetching a word first when the variant needs one.
    #[instrument(skip(self, players), fields(room = %self.id, game = %settings.kind()))]
    pub async fn start(
        &self,
        players: Vec<PlayerId>,
        settings: Settings,
        now: DateTime<Utc>,
    ) -> Result<Broadcast, RoomError> {
        let word = if settings.needs_vocabulary() {
            let fetched = self
                .services
                .words
                .fetch(self.services.language)
                .await
                .map_err(|e| GameError::SourceUnavailable { reason: e.message })?;
            debug!(source = self.services.words.name(), length = fetched.length, "Word sourced");
            Some(fetched)
        } else {
            None
        };
        self.start_with_word(players, settings, word, now).await
    }

    /// Starts a game with an already sourced word.
    #[instrument(skip(self, players, word), fields(room = %self.id, game = %settings.kind()))]
    pub async fn start_with_word(
        &self,
        players: Vec<PlayerId>,
        settings: Settings,
        word: Option<SourcedWord>,
        now: DateTime<Utc>,
    ) -> Result<Broadcast, RoomError> {
        let mut slot = self.game.lock().await;
        if slot.as_ref().is_some_and(|g| !g.is_over()) {
            warn!("Start refused, game in progress");
            return Err(RoomError::InProgress {
                room: self.id.clone(),
            });
        }

        let game = {
            let mut rng = self.rng.lock().await;
            GameInstance::create(players, settings, word.as_ref(), &mut *rng, now)?
        };
        self.persist(&game).await?;

        let broadcast = Broadcast::of(&game, RoomReport::Started);
        *slot = Some(game);
        drop(slot);
        self.changed.notify_waiters();
        info!("Game started");
        Ok(broadcast)
    }

    /// Submits a player's secret.
    #[instrument(skip(self, payload), fields(room = %self.id))]
    pub async fn apply_setup(
        &self,
        player: &PlayerId,
        payload: SetupPayload,
        now: DateTime<Utc>,
    ) -> Result<Broadcast, RoomError> {
        self.commit(|game| game.apply_setup(player, payload, now).map(RoomReport::Setup))
            .await
    }

    /// Resolves a move. Word guesses are checked against the lexicon before
    /// the game is touched.
    #[instrument(skip(self, action), fields(room = %self.id))]
    pub async fn apply_move(
        &self,
        player: &PlayerId,
        action: Move,
        now: DateTime<Utc>,
    ) -> Result<Broadcast, RoomError> {
        // The lookup may hit the network, so it runs before the lock. It only
        // depends on the word; length and first letter are checked again by
        // the engine against whatever game holds the lock at commit time.
        if let Move::Motus(guess) = &action {
            let known = self
                .services
                .lexicon
                .contains(&guess.word, self.services.language)
                .await?;
            if !known {
                warn!(word = %guess.word, "Guess not in lexicon");
                return Err(GameError::invalid(format!("{} is not a known word", guess.word)).into());
            }
        }
        self.commit(|game| game.apply_move(player, action, now).map(RoomReport::Move))
            .await
    }

    /// Passes the turn once the deadline has gone by.
    #[instrument(skip(self), fields(room = %self.id))]
    pub async fn expire_turn(&self, now: DateTime<Utc>) -> Result<Broadcast, RoomError> {
        self.commit(|game| game.expire_turn(now).map(RoomReport::TurnExpired))
            .await
    }

    /// Current public state, if a game exists.
    pub async fn snapshot(&self) -> Option<PublicState> {
        self.game.lock().await.as_ref().map(GameInstance::public_state)
    }

    /// Every seated player's view, if a game exists.
    pub async fn views(&self) -> Option<BTreeMap<PlayerId, View>> {
        self.game.lock().await.as_ref().map(views_of)
    }

    /// When the current turn runs out, for timed games.
    pub async fn turn_deadline(&self) -> Option<DateTime<Utc>> {
        self.game
            .lock()
            .await
            .as_ref()
            .and_then(GameInstance::turn_deadline)
    }

    /// Drops the hosted game and its stored secrets.
    #[instrument(skip(self), fields(room = %self.id))]
    pub async fn reset(&self) -> Result<(), RoomError> {
        let mut slot = self.game.lock().await;
        self.services.vault.discard(&self.id).await?;
        *slot = None;
        drop(slot);
        self.changed.notify_waiters();
        info!("Room reset");
        Ok(())
    }

    /// Rebuilds the game from a public state and re-injects the secrets the
    /// vault kept. Without vault secrets every mutation fails with
    /// [`GameError::SecretsMissing`] until [`GameRoom::recover`] runs again.
    #[instrument(skip(self, public), fields(room = %self.id))]
    pub async fn recover(&self, public: PublicState) -> Result<Broadcast, RoomError> {
        let mut game = GameInstance::restore(public);
        let secrets = self.services.vault.load(&self.id).await?;
        let secrets_restored = secrets.is_some();
        match secrets {
            Some(secrets) => game.inject_secrets(secrets)?,
            None => warn!("Vault has no secrets for this room"),
        }

        let mut slot = self.game.lock().await;
        let broadcast = Broadcast::of(&game, RoomReport::Recovered { secrets_restored });
        *slot = Some(game);
        drop(slot);
        self.changed.notify_waiters();
        info!(secrets_restored, "Game recovered");
        Ok(broadcast)
    }

    /// Applies `step` to a copy of the game, stores the copy's secrets, then
    /// swaps the copy in.
    async fn commit<F>(&self, step: F) -> Result<Broadcast, RoomError>
    where
        F: FnOnce(&mut GameInstance) -> Result<RoomReport, GameError>,
    {
        let mut slot = self.game.lock().await;
        let current = slot.as_ref().ok_or_else(|| RoomError::NoGame {
            room: self.id.clone(),
        })?;

        let mut next = current.clone();
        let report = step(&mut next).inspect_err(|e| {
            warn!(error = %e, kind = %e.kind(), "Operation rejected");
        })?;
        self.persist(&next).await?;

        if next.is_over() && !current.is_over() {
            info!(winner = ?next.winner(), "Game ended");
        }
        let broadcast = Broadcast::of(&next, report);
        *slot = Some(next);
        drop(slot);
        self.changed.notify_waiters();
        Ok(broadcast)
    }

    async fn persist(&self, game: &GameInstance) -> Result<(), VaultError> {
        match game.secrets() {
            Some(secrets) => self.services.vault.save(&self.id, &secrets).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;
    use crate::words::StaticWords;
    use parlor_rules::games::digits::{CodeGuess, DigitsSecrets, DigitsSettings, SecretCode};
    use parlor_rules::games::motus::{MotusSettings, WordGuess};
    use parlor_rules::SecretStore;

    fn services(words: &[&str]) -> RoomServices {
        let list = Arc::new(StaticWords::with_seed(
            words.iter().map(|w| w.to_string()).collect(),
            5,
        ));
        RoomServices::new(list.clone(), list, Arc::new(MemoryVault::new()), Language::Fr)
    }

    fn seats() -> Vec<PlayerId> {
        vec![PlayerId::from("ann"), PlayerId::from("ben")]
    }

    #[tokio::test]
    async fn test_moves_need_a_game() {
        let room = GameRoom::with_seed("r1", services(&["maison"]), 1);
        let err = room
            .expire_turn(Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::NoGame { .. }));
        assert!(room.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_lexicon_rejects_unknown_guess() {
        let room = GameRoom::with_seed("r2", services(&["maison"]), 1);
        room.start(seats(), Settings::Motus(MotusSettings::default()), Utc::now())
            .await
            .unwrap();
        let guess = |w: &str| Move::Motus(WordGuess { word: w.into() });

        let err = room
            .apply_move(&PlayerId::from("ann"), guess("mxyzzy"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.game_kind(), Some(GameErrorKind::InvalidPayload));

        let broadcast = room
            .apply_move(&PlayerId::from("ann"), guess("maison"), Utc::now())
            .await
            .unwrap();
        assert!(matches!(broadcast.report, RoomReport::Move(_)));
    }

    #[tokio::test]
    async fn test_rejected_move_leaves_room_unchanged() {
        let room = GameRoom::with_seed("r3", services(&[]), 1);
        room.start(seats(), Settings::Digits(DigitsSettings::default()), Utc::now())
            .await
            .unwrap();
        let before = room.snapshot().await.unwrap();
        let err = room
            .apply_move(
                &PlayerId::from("ann"),
                Move::Digits(CodeGuess { guess: "1234".into() }),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.game_kind(), Some(GameErrorKind::WrongPhase));
        assert_eq!(room.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_in_progress_game_blocks_start() {
        let room = GameRoom::with_seed("r4", services(&[]), 1);
        let settings = Settings::Digits(DigitsSettings::default());
        room.start(seats(), settings, Utc::now()).await.unwrap();
        let err = room.start(seats(), settings, Utc::now()).await.unwrap_err();
        assert!(matches!(err, RoomError::InProgress { .. }));

        room.reset().await.unwrap();
        room.start(seats(), settings, Utc::now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_word_is_source_unavailable() {
        let room = GameRoom::with_seed("r5", services(&[]), 1);
        let err = room
            .start(seats(), Settings::Motus(MotusSettings::default()), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.game_kind(), Some(GameErrorKind::SourceUnavailable));
        assert!(room.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_recover_reinjects_vault_secrets() {
        let services = services(&[]);
        let room = GameRoom::with_seed("r6", services.clone(), 1);
        room.start(seats(), Settings::Digits(DigitsSettings::default()), Utc::now())
            .await
            .unwrap();
        let code = |c: &str| SetupPayload::Digits(SecretCode { code: c.into() });
        room.apply_setup(&PlayerId::from("ann"), code("4821"), Utc::now())
            .await
            .unwrap();
        let public = room.snapshot().await.unwrap();

        let fresh = GameRoom::with_seed("r6", services, 2);
        let broadcast = fresh.recover(public).await.unwrap();
        assert_eq!(
            broadcast.report,
            RoomReport::Recovered {
                secrets_restored: true
            }
        );
        let outcome = fresh
            .apply_setup(&PlayerId::from("ben"), code("1357"), Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            outcome.report,
            RoomReport::Setup(SetupOutcome {
                play_started: true,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_recover_refuses_corrupted_vault_entry() {
        let services = services(&[]);
        let room = GameRoom::with_seed("r7", services.clone(), 1);
        room.start(seats(), Settings::Digits(DigitsSettings::default()), Utc::now())
            .await
            .unwrap();
        room.apply_setup(
            &PlayerId::from("ann"),
            SetupPayload::Digits(SecretCode { code: "4821".into() }),
            Utc::now(),
        )
        .await
        .unwrap();
        let public = room.snapshot().await.unwrap();

        let corrupted = SecretStore::Digits(DigitsSecrets {
            codes: [(PlayerId::from("ann"), "48a1".to_string())].into_iter().collect(),
        });
        services.vault.save("r7", &corrupted).await.unwrap();

        let fresh = GameRoom::with_seed("r7", services, 2);
        let err = fresh.recover(public).await.unwrap_err();
        assert_eq!(err.game_kind(), Some(GameErrorKind::InvalidPayload));
        assert!(fresh.snapshot().await.is_none());
    }
}
