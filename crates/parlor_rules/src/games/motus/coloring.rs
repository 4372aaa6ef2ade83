//! Two-pass letter coloring.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Color of one guessed letter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LetterColor {
    /// Right letter, right place.
    Exact,
    /// Letter elsewhere in the target, not yet accounted for.
    Partial,
    /// Letter not (or no longer) available in the target.
    Absent,
}

/// One colored letter of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterResult {
    /// The guessed letter, canonical uppercase.
    pub letter: char,
    /// Its color.
    pub color: LetterColor,
}

/// Colors `guess` against `target`. Both are canonical and of equal length.
///
/// Exact matches are taken first and removed from the pool of target
/// letters, then the remaining positions are scanned left to right and only
/// consume letters still left in the pool.
pub fn color(target: &str, guess: &str) -> Vec<LetterResult> {
    let target: Vec<char> = target.chars().collect();
    let guess: Vec<char> = guess.chars().collect();

    let mut colors = vec![None; guess.len()];
    let mut remaining: HashMap<char, usize> = HashMap::new();
    for (i, (&t, &g)) in target.iter().zip(&guess).enumerate() {
        if t == g {
            colors[i] = Some(LetterColor::Exact);
        } else {
            *remaining.entry(t).or_default() += 1;
        }
    }

    guess
        .iter()
        .zip(colors)
        .map(|(&letter, exact)| {
            let color = exact.unwrap_or_else(|| match remaining.get_mut(&letter) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    LetterColor::Partial
                }
                _ => LetterColor::Absent,
            });
            LetterResult { letter, color }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use LetterColor::*;

    fn colors(target: &str, guess: &str) -> Vec<LetterColor> {
        color(target, guess).into_iter().map(|r| r.color).collect()
    }

    #[test]
    fn test_exact_and_absent() {
        assert_eq!(
            colors("ABCDE", "ABXXE"),
            vec![Exact, Exact, Absent, Absent, Exact]
        );
    }

    #[test]
    fn test_identical_is_all_exact() {
        assert!(colors("CRANE", "CRANE").iter().all(|c| *c == Exact));
    }

    #[test]
    fn test_repeated_letter_consumes_pool_once() {
        // One E in the target: the exact E wins, the other is absent.
        assert_eq!(
            colors("CRANE", "EERIE"),
            vec![Absent, Absent, Partial, Absent, Exact]
        );
    }

    #[test]
    fn test_partial_before_exact_does_not_steal() {
        // Second L is exact; the first L has nothing left to match.
        assert_eq!(
            colors("HELLO", "LLXLX"),
            vec![Partial, Absent, Absent, Exact, Absent]
        );
    }

    #[test]
    fn test_permutation_partials() {
        assert_eq!(
            colors("CRANE", "RANCE"),
            vec![Partial, Partial, Partial, Partial, Exact]
        );
    }
}
