//! Parlor server - host side of the parlor game engine
//!
//! The engine in `parlor_rules` is pure: no I/O, no clock, no locking. This
//! crate supplies everything around it.
//!
//! # Architecture
//!
//! - **Words**: [`WordSource`] implementations that hand out target words,
//!   and [`Lexicon`] implementations that check guessed words
//! - **Vault**: [`SecretVault`], the side channel that keeps secrets out of
//!   broadcasts and re-injects them after a restore
//! - **Room**: [`GameRoom`], the single writer around one game instance
//! - **Deadline**: the turn watcher for timed games
//! - **Config**: [`ServerConfig`] from TOML
//! - **Replay**: scripted games for the `parlor` binary
//!
//! # Example
//!
//! ```
//! use parlor_server::{AcceptAll, GameRoom, Language, MemoryVault, RoomServices, StaticWords};
//! use parlor_rules::{PlayerId, Settings};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), parlor_server::RoomError> {
//! let services = RoomServices::new(
//!     Arc::new(StaticWords::new(vec!["maison".to_string()])),
//!     Arc::new(AcceptAll),
//!     Arc::new(MemoryVault::new()),
//!     Language::Fr,
//! );
//! let room = GameRoom::new("lobby-1", services);
//! let players = vec![PlayerId::from("ann"), PlayerId::from("ben")];
//! let broadcast = room.start(players, Settings::SeaBattle, chrono::Utc::now()).await?;
//! assert_eq!(broadcast.views.len(), 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod deadline;
mod lexicon;
mod replay;
mod room;
mod telemetry;
mod vault;
mod words;

// Crate-level exports - Word sourcing
pub use lexicon::{AcceptAll, Lexicon, WiktionaryLexicon};
pub use words::{
    DictionaryWords, FallbackSource, Language, RANDOM_WORD_API, RandomWordApi, StaticWords,
    WordSource, WordSourceError,
};

// Crate-level exports - Secrets
pub use vault::{FileVault, MemoryVault, SecretVault, VaultError};

// Crate-level exports - Rooms
pub use deadline::spawn_turn_watcher;
pub use room::{Broadcast, GameRoom, RoomError, RoomReport, RoomServices};

// Crate-level exports - Configuration and tooling
pub use config::{ConfigError, GamesConfig, LexiconKind, ServerConfig, VaultConfig, WordsConfig};
pub use replay::{REPLAY_ROOM, ReplayScript, ScriptStep, StepOutcome, run_script};
pub use telemetry::{DEFAULT_FILTER, init_tracing};
