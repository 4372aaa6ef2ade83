//! Word sources for games that need a sourced word.

use async_trait::async_trait;
use derive_more::{Display, Error};
use parlor_rules::SourcedWord;
use parlor_rules::core::text::canonical;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Default random-word API.
pub const RANDOM_WORD_API: &str = "https://random-word-api.herokuapp.com";

/// Language a word is requested in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// French.
    #[default]
    Fr,
}

/// Word source or lexicon error.
#[derive(Debug, Clone, Display, Error)]
#[display("Word source error: {} at {}:{}", message, file, line)]
pub struct WordSourceError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl WordSourceError {
    /// Creates a new word source error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Word source error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Normalizes a raw word into a sourced word, if any letter survives.
fn sourced(raw: &str) -> Option<SourcedWord> {
    let word = canonical(raw);
    let length = word.chars().count();
    (length > 0).then(|| SourcedWord::new(word, length))
}

/// Something that can hand out a random word.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Fetches one normalized word in `language`.
    async fn fetch(&self, language: Language) -> Result<SourcedWord, WordSourceError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────
//  In-memory list
// ─────────────────────────────────────────────────────────────

/// A fixed word list, picked from at random.
///
/// Also serves as a [`crate::Lexicon`] over the same words.
#[derive(Debug)]
pub struct StaticWords {
    words: Vec<String>,
    rng: Mutex<ChaCha8Rng>,
}

impl StaticWords {
    /// Word list with an OS-seeded picker.
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words,
            rng: Mutex::new(ChaCha8Rng::from_os_rng()),
        }
    }

    /// Word list with a deterministic picker.
    pub fn with_seed(words: Vec<String>, seed: u64) -> Self {
        Self {
            words,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// True if `word` is in the list, ignoring case and accents.
    pub fn includes(&self, word: &str) -> bool {
        let wanted = canonical(word);
        self.words.iter().any(|w| canonical(w) == wanted)
    }

    /// Picks one raw word.
    fn pick(&self) -> Result<&str, WordSourceError> {
        if self.words.is_empty() {
            return Err(WordSourceError::new("word list is empty".to_string()));
        }
        let index = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| WordSourceError::new("word picker lock poisoned".to_string()))?;
            rng.random_range(0..self.words.len())
        };
        Ok(&self.words[index])
    }
}

#[async_trait]
impl WordSource for StaticWords {
    #[instrument(skip(self), fields(words = self.words.len()))]
    async fn fetch(&self, language: Language) -> Result<SourcedWord, WordSourceError> {
        let raw = self.pick()?;
        sourced(raw).ok_or_else(|| WordSourceError::new(format!("{raw:?} has no usable letters")))
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ─────────────────────────────────────────────────────────────
//  Dictionary file
// ─────────────────────────────────────────────────────────────

/// Accepted dictionary file layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DictionaryFile {
    Keyed { mots: Vec<String> },
    Plain(Vec<String>),
}

/// A dictionary loaded from a JSON file, serving a single language.
#[derive(Debug, derive_getters::Getters)]
pub struct DictionaryWords {
    language: Language,
    #[getter(skip)]
    words: StaticWords,
}

impl DictionaryWords {
    /// Loads `{"mots": [...]}` or a plain JSON array of words.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, language: Language) -> Result<Self, WordSourceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WordSourceError::new(format!("Failed to read dictionary: {}", e)))?;
        let file: DictionaryFile = serde_json::from_str(&content)
            .map_err(|e| WordSourceError::new(format!("Failed to parse dictionary: {}", e)))?;
        let words = match file {
            DictionaryFile::Keyed { mots } => mots,
            DictionaryFile::Plain(words) => words,
        };
        info!(%language, words = words.len(), "Dictionary loaded");
        Ok(Self {
            language,
            words: StaticWords::new(words),
        })
    }

    /// True if `word` is in the dictionary, ignoring case and accents.
    pub fn includes(&self, word: &str) -> bool {
        self.words.includes(word)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.words.words.len()
    }

    /// True if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.words.words.is_empty()
    }
}

#[async_trait]
impl WordSource for DictionaryWords {
    #[instrument(skip(self), fields(dictionary = %self.language))]
    async fn fetch(&self, language: Language) -> Result<SourcedWord, WordSourceError> {
        if language != self.language {
            return Err(WordSourceError::new(format!(
                "dictionary serves {} only",
                self.language
            )));
        }
        self.words.fetch(language).await
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

// ─────────────────────────────────────────────────────────────
//  HTTP
// ─────────────────────────────────────────────────────────────

/// The random-word HTTP API: `GET {base}/word?lang={language}` returns a
/// JSON array of words.
#[derive(Debug, Clone)]
pub struct RandomWordApi {
    client: reqwest::Client,
    base_url: String,
}

impl RandomWordApi {
    /// Client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for RandomWordApi {
    fn default() -> Self {
        Self::new(RANDOM_WORD_API)
    }
}

#[async_trait]
impl WordSource for RandomWordApi {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, language: Language) -> Result<SourcedWord, WordSourceError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/word", self.base_url),
            &[("lang", language.to_string())],
        )
        .map_err(|e| WordSourceError::new(format!("Invalid random word url: {}", e)))?;
        debug!(%url, "Requesting random word");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WordSourceError::new(format!("Random word request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WordSourceError::new(format!(
                "Random word API error {}",
                status
            )));
        }

        let words: Vec<String> = response
            .json()
            .await
            .map_err(|e| WordSourceError::new(format!("Failed to parse response: {}", e)))?;
        let raw = words
            .first()
            .ok_or_else(|| WordSourceError::new("No words returned from API".to_string()))?;
        sourced(raw).ok_or_else(|| WordSourceError::new(format!("{raw:?} has no usable letters")))
    }

    fn name(&self) -> &str {
        "random-word-api"
    }
}

// ─────────────────────────────────────────────────────────────
//  Fallback chain
// ─────────────────────────────────────────────────────────────

/// Tries each source in order and returns the first word obtained.
pub struct FallbackSource {
    sources: Vec<Box<dyn WordSource>>,
}

impl FallbackSource {
    /// Chain over `sources`, first one preferred.
    pub fn new(sources: Vec<Box<dyn WordSource>>) -> Self {
        Self { sources }
    }
}

impl std::fmt::Debug for FallbackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("FallbackSource").field("sources", &names).finish()
    }
}

#[async_trait]
impl WordSource for FallbackSource {
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    async fn fetch(&self, language: Language) -> Result<SourcedWord, WordSourceError> {
        for source in &self.sources {
            match source.fetch(language).await {
                Ok(word) => {
                    debug!(source = source.name(), "Word sourced");
                    return Ok(word);
                }
                Err(e) => warn!(source = source.name(), error = %e, "Word source failed, trying next"),
            }
        }
        Err(WordSourceError::new(format!(
            "all {} word sources failed",
            self.sources.len()
        )))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
