//! Word syntax and normalization helpers.

use super::error::GameError;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Shortest word accepted by player-submitted word games.
pub const MIN_WORD_LEN: usize = 2;
/// Longest word accepted by player-submitted word games.
pub const MAX_WORD_LEN: usize = 20;

/// Validates a player-submitted word: ASCII letters only, 2-20 long.
///
/// Returns the trimmed word unchanged in case.
pub fn plain_word<'a>(raw: &'a str, what: &str) -> Result<&'a str, GameError> {
    let word = raw.trim();
    let len = word.chars().count();
    if !(MIN_WORD_LEN..=MAX_WORD_LEN).contains(&len) {
        return Err(GameError::invalid(format!(
            "{what} must be {MIN_WORD_LEN}-{MAX_WORD_LEN} letters, got {len}"
        )));
    }
    if !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(GameError::invalid(format!(
            "{what} must contain only letters A-Z"
        )));
    }
    Ok(word)
}

/// Canonical form for externally sourced vocabulary.
///
/// Diacritics are stripped, letters uppercased, and anything outside `A-Z`
/// dropped, so `"Élève"` becomes `"ELEVE"`.
pub fn canonical(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .filter(char::is_ascii_uppercase)
        .collect()
}

/// Case-insensitive equality in canonical form.
pub fn same_word(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_word_trims() {
        assert_eq!(plain_word("  Apple ", "word").unwrap(), "Apple");
    }

    #[test]
    fn test_plain_word_rejects_digits_and_length() {
        assert!(plain_word("abc1", "word").is_err());
        assert!(plain_word("a", "word").is_err());
        assert!(plain_word(&"a".repeat(21), "word").is_err());
        assert!(plain_word("élan", "word").is_err());
    }

    #[test]
    fn test_canonical_strips_diacritics() {
        assert_eq!(canonical("Élève"), "ELEVE");
        assert_eq!(canonical("garçon"), "GARCON");
        assert_eq!(canonical("c'est-à-dire"), "CESTADIRE");
    }

    #[test]
    fn test_same_word_ignores_case() {
        assert!(same_word("Crane", "CRANE"));
        assert!(!same_word("crane", "crank"));
    }
}
