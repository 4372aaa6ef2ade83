//! Server configuration.

use crate::lexicon::{AcceptAll, Lexicon, WiktionaryLexicon};
use crate::room::RoomServices;
use crate::vault::{FileVault, MemoryVault, SecretVault};
use crate::words::{DictionaryWords, FallbackSource, Language, RANDOM_WORD_API, RandomWordApi, WordSource};
use derive_getters::Getters;
use derive_more::{Display, Error};
use parlor_rules::games::chains::{ChainsSettings, DEFAULT_CHAIN_COUNT, TURN_LIMIT_MS};
use parlor_rules::games::digits::{DEFAULT_CODE_LENGTH, DigitsSettings};
use parlor_rules::games::motus::{DEFAULT_MAX_ATTEMPTS, MotusSettings};
use parlor_rules::{GameKind, Settings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Whole server configuration, one table per concern.
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Word sourcing and guess checking.
    #[serde(default)]
    words: WordsConfig,

    /// Per-variant defaults.
    #[serde(default)]
    games: GamesConfig,

    /// Where secrets are kept.
    #[serde(default)]
    vault: VaultConfig,
}

/// How guessed words are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LexiconKind {
    /// Every word is accepted.
    #[default]
    AcceptAll,
    /// Words must appear in the configured dictionary.
    Dictionary,
    /// Words must have a wiktionary page.
    Wiktionary,
}

/// `[words]` table.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct WordsConfig {
    /// Language words are fetched and checked in.
    #[serde(default)]
    language: Language,

    /// JSON dictionary, tried before the API.
    #[serde(default)]
    dictionary: Option<PathBuf>,

    /// Random-word API base url. Empty disables the API.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// Guess checking.
    #[serde(default)]
    lexicon: LexiconKind,

    /// Wiktionary mirror, instead of `{language}.wiktionary.org`.
    #[serde(default)]
    lexicon_url: Option<String>,
}

fn default_api_url() -> String {
    RANDOM_WORD_API.to_string()
}

impl Default for WordsConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            dictionary: None,
            api_url: default_api_url(),
            lexicon: LexiconKind::default(),
            lexicon_url: None,
        }
    }
}

/// `[games]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GamesConfig {
    /// Chains per player.
    #[serde(default = "default_chain_count")]
    chain_count: usize,

    /// Digits code length.
    #[serde(default = "default_code_length")]
    code_length: usize,

    /// Motus attempt budget.
    #[serde(default = "default_motus_attempts")]
    motus_attempts: usize,

    /// Chains turn limit.
    #[serde(default = "default_turn_seconds")]
    turn_seconds: u32,
}

fn default_chain_count() -> usize {
    DEFAULT_CHAIN_COUNT
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_motus_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_turn_seconds() -> u32 {
    (TURN_LIMIT_MS / 1_000) as u32
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            chain_count: default_chain_count(),
            code_length: default_code_length(),
            motus_attempts: default_motus_attempts(),
            turn_seconds: default_turn_seconds(),
        }
    }
}

impl GamesConfig {
    /// Creation settings for `kind` using these defaults.
    pub fn settings_for(&self, kind: GameKind) -> Settings {
        match kind {
            GameKind::Digits => Settings::Digits(DigitsSettings::new(self.code_length)),
            GameKind::Motus => Settings::Motus(MotusSettings::new(self.motus_attempts)),
            GameKind::Chains => Settings::Chains(ChainsSettings::with_turn_limit(
                self.chain_count,
                i64::from(self.turn_seconds) * 1_000,
            )),
            GameKind::Hangman => Settings::Hangman,
            GameKind::SeaBattle => Settings::SeaBattle,
            GameKind::MrWhite => Settings::MrWhite,
        }
    }
}

/// `[vault]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaultConfig {
    /// Secrets kept in process memory.
    #[default]
    Memory,
    /// One JSON file per room.
    Directory {
        /// Vault directory.
        path: PathBuf,
    },
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::parse(&content)?;
        info!(language = %config.words.language, lexicon = %config.words.lexicon, "Config loaded successfully");
        Ok(config)
    }

    /// Parses TOML text and checks that the sections agree.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.words.lexicon == LexiconKind::Dictionary && self.words.dictionary.is_none() {
            return Err(ConfigError::new(
                "lexicon = \"dictionary\" needs words.dictionary".to_string(),
            ));
        }
        if self.games.turn_seconds == 0 {
            return Err(ConfigError::new("games.turn_seconds must be positive".to_string()));
        }
        Ok(())
    }

    /// Dictionary first, then the random-word API.
    #[instrument(skip(self))]
    pub fn word_source(&self) -> Result<Arc<dyn WordSource>, ConfigError> {
        let mut sources: Vec<Box<dyn WordSource>> = Vec::new();
        if let Some(path) = &self.words.dictionary {
            sources.push(Box::new(self.dictionary(path)?));
        }
        if !self.words.api_url.is_empty() {
            sources.push(Box::new(RandomWordApi::new(self.words.api_url.clone())));
        }
        if sources.is_empty() {
            return Err(ConfigError::new("no word source configured".to_string()));
        }
        debug!(sources = sources.len(), "Word sources built");
        Ok(Arc::new(FallbackSource::new(sources)))
    }

    /// Guess checker selected by `words.lexicon`.
    #[instrument(skip(self))]
    pub fn lexicon(&self) -> Result<Arc<dyn Lexicon>, ConfigError> {
        Ok(match self.words.lexicon {
            LexiconKind::AcceptAll => Arc::new(AcceptAll),
            LexiconKind::Dictionary => {
                let path = self.words.dictionary.as_ref().ok_or_else(|| {
                    ConfigError::new("dictionary lexicon without a dictionary".to_string())
                })?;
                Arc::new(self.dictionary(path)?)
            }
            LexiconKind::Wiktionary => match &self.words.lexicon_url {
                Some(url) => Arc::new(WiktionaryLexicon::with_base_url(url.clone())),
                None => Arc::new(WiktionaryLexicon::new()),
            },
        })
    }

    /// Secret vault selected by `[vault]`.
    #[instrument(skip(self))]
    pub async fn secret_vault(&self) -> Result<Arc<dyn SecretVault>, ConfigError> {
        Ok(match &self.vault {
            VaultConfig::Memory => Arc::new(MemoryVault::new()),
            VaultConfig::Directory { path } => Arc::new(
                FileVault::open(path)
                    .await
                    .map_err(|e| ConfigError::new(format!("Failed to open vault: {}", e)))?,
            ),
        })
    }

    /// Every collaborator a room needs.
    pub async fn services(&self) -> Result<RoomServices, ConfigError> {
        Ok(RoomServices::new(
            self.word_source()?,
            self.lexicon()?,
            self.secret_vault().await?,
            self.words.language,
        ))
    }

    fn dictionary(&self, path: &Path) -> Result<DictionaryWords, ConfigError> {
        DictionaryWords::load(path, self.words.language)
            .map_err(|e| ConfigError::new(format!("Failed to load dictionary: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
