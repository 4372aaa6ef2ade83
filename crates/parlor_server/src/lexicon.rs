//! Dictionary lookups for guessed words.

use crate::words::{DictionaryWords, Language, StaticWords, WordSourceError};
use async_trait::async_trait;
use parlor_rules::core::text::canonical;
use tracing::{debug, instrument};

/// Answers whether a word exists.
#[async_trait]
pub trait Lexicon: Send + Sync {
    /// True if `word` is a known word in `language`.
    async fn contains(&self, word: &str, language: Language) -> Result<bool, WordSourceError>;
}

/// Accepts every word.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl Lexicon for AcceptAll {
    async fn contains(&self, _word: &str, _language: Language) -> Result<bool, WordSourceError> {
        Ok(true)
    }
}

#[async_trait]
impl Lexicon for StaticWords {
    async fn contains(&self, word: &str, _language: Language) -> Result<bool, WordSourceError> {
        Ok(self.includes(word))
    }
}

#[async_trait]
impl Lexicon for DictionaryWords {
    async fn contains(&self, word: &str, language: Language) -> Result<bool, WordSourceError> {
        Ok(language == *self.language() && self.includes(word))
    }
}

/// Wiktionary's query API. Missing pages come back keyed `-1`.
#[derive(Debug, Clone)]
pub struct WiktionaryLexicon {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl WiktionaryLexicon {
    /// Lexicon over the public wiktionaries.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Lexicon over a single mirror, whatever the language.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
        }
    }

    fn base(&self, language: Language) -> String {
        match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{language}.wiktionary.org"),
        }
    }
}

impl Default for WiktionaryLexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// True if a query response names at least one existing page.
fn page_exists(body: &serde_json::Value) -> bool {
    body.get("query")
        .and_then(|q| q.get("pages"))
        .and_then(|p| p.as_object())
        .is_some_and(|pages| !pages.is_empty() && !pages.contains_key("-1"))
}

#[async_trait]
impl Lexicon for WiktionaryLexicon {
    #[instrument(skip(self))]
    async fn contains(&self, word: &str, language: Language) -> Result<bool, WordSourceError> {
        let title = canonical(word).to_lowercase();
        if title.is_empty() {
            return Ok(false);
        }
        let url = reqwest::Url::parse_with_params(
            &format!("{}/w/api.php", self.base(language)),
            &[
                ("action", "query"),
                ("titles", title.as_str()),
                ("format", "json"),
            ],
        )
        .map_err(|e| WordSourceError::new(format!("Invalid wiktionary url: {}", e)))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WordSourceError::new(format!("Wiktionary request failed: {}", e)))?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "Wiktionary refused lookup");
            return Ok(false);
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WordSourceError::new(format!("Failed to parse response: {}", e)))?;
        let found = page_exists(&body);
        debug!(%title, found, "Wiktionary lookup");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_page_is_keyed_minus_one() {
        let missing = json!({"query": {"pages": {"-1": {"title": "zzkq", "missing": ""}}}});
        assert!(!page_exists(&missing));
        let found = json!({"query": {"pages": {"1234": {"title": "maison"}}}});
        assert!(page_exists(&found));
        assert!(!page_exists(&json!({})));
    }

    #[tokio::test]
    async fn test_static_lexicon_ignores_accents() {
        let lexicon = StaticWords::new(vec!["élève".to_string()]);
        assert!(lexicon.contains("ELEVE", Language::Fr).await.unwrap());
        assert!(!lexicon.contains("ELEVES", Language::Fr).await.unwrap());
        assert!(AcceptAll.contains("zzz", Language::En).await.unwrap());
    }

    #[test]
    fn test_base_follows_language() {
        assert_eq!(WiktionaryLexicon::new().base(Language::En), "https://en.wiktionary.org");
        assert_eq!(
            WiktionaryLexicon::with_base_url("http://mirror/").base(Language::Fr),
            "http://mirror"
        );
    }
}
