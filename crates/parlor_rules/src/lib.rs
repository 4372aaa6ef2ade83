//! Parlor rules - authoritative state engine for multiplayer parlor games
//!
//! The engine owns the full state of one game, validates every submitted
//! action against the current phase and turn, resolves it atomically, and
//! projects per-player views that never leak an opponent's secret.
//!
//! # Architecture
//!
//! - **Core**: players, phases, turns, errors, and the validate-then-resolve
//!   [`Table`] every variant runs on
//! - **Games**: digits, motus, chains, hangman, sea battle and Mr White
//! - **Instance**: [`GameInstance`], the serde-tagged sum type callers hold
//!
//! The engine does no I/O and has no clock of its own: callers pass `now`
//! and an RNG into every operation that needs one.
//!
//! # Example
//!
//! ```
//! use parlor_rules::{GameInstance, Move, PlayerId, SetupPayload, Settings};
//! use parlor_rules::games::hangman::{LetterGuess, SecretWord};
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), parlor_rules::GameError> {
//! let (ann, ben) = (PlayerId::from("ann"), PlayerId::from("ben"));
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let now = chrono::Utc::now();
//! let mut game =
//!     GameInstance::create(vec![ann.clone(), ben.clone()], Settings::Hangman, None, &mut rng, now)?;
//! game.apply_setup(&ann, SetupPayload::Hangman(SecretWord { word: "chat".into() }), now)?;
//! game.apply_setup(&ben, SetupPayload::Hangman(SecretWord { word: "loup".into() }), now)?;
//! game.apply_move(&ben, Move::Hangman(LetterGuess { letter: "a".into() }), now)?;
//! assert!(!game.is_over());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod core;
pub mod games;
mod instance;

// Crate-level exports - Core scaffolding
pub use crate::core::{
    CommonState, GameError, GameErrorKind, Lifecycle, PlayerId, Roster, SetupOutcome, Stage,
    Status, Table, TurnClock, TurnCursor, Variant, Winner,
};

// Crate-level exports - Sum type
pub use crate::instance::{
    GameInstance, GameKind, Move, MoveReport, PublicState, SecretStore, Settings, SetupPayload,
    SourcedWord, View,
};
