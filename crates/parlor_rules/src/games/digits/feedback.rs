//! Bulls-and-cows style scoring.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Score of one guess against a secret code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feedback {
    /// Guess digits present in the secret, counted as a multiset.
    pub correct_digits: usize,
    /// Guess digits matching the secret at the same position.
    pub correct_place: usize,
}

/// Scores `guess` against `secret`. Both are expected to be ASCII digit
/// strings of the same length; anything else is not counted.
///
/// A digit repeated in the guess only matches as many times as it occurs in
/// the secret.
#[instrument(level = "debug", skip(secret))]
pub fn score(secret: &str, guess: &str) -> Feedback {
    let correct_place = secret
        .bytes()
        .zip(guess.bytes())
        .filter(|(s, g)| s == g)
        .count();

    let mut remaining = [0usize; 10];
    for d in digits(secret) {
        remaining[d] += 1;
    }
    let mut correct_digits = 0;
    for d in digits(guess) {
        if remaining[d] > 0 {
            remaining[d] -= 1;
            correct_digits += 1;
        }
    }

    Feedback {
        correct_digits,
        correct_place,
    }
}

fn digits(code: &str) -> impl Iterator<Item = usize> + '_ {
    code.chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let fb = score("1234", "1234");
        assert_eq!(fb.correct_place, 4);
        assert_eq!(fb.correct_digits, 4);
    }

    #[test]
    fn test_permutation_counts_every_digit() {
        let fb = score("4821", "1824");
        assert_eq!(fb.correct_digits, 4);
        assert_eq!(fb.correct_place, 2);
    }

    #[test]
    fn test_repeated_guess_digit_is_capped() {
        // Only one 1 in the secret, so four 1s match once.
        let fb = score("1234", "1111");
        assert_eq!(fb.correct_digits, 1);
        assert_eq!(fb.correct_place, 1);
    }

    #[test]
    fn test_repeated_secret_digit() {
        let fb = score("1122", "2211");
        assert_eq!(fb.correct_digits, 4);
        assert_eq!(fb.correct_place, 0);
    }

    #[test]
    fn test_stray_bytes_are_not_counted() {
        let fb = score("12a4", "1234");
        assert_eq!(fb.correct_digits, 3);
        assert_eq!(fb.correct_place, 3);
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(
            score("1234", "5678"),
            Feedback {
                correct_digits: 0,
                correct_place: 0
            }
        );
    }
}
