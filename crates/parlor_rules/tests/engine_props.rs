//! Property tests for the pure scoring and placement helpers.

use parlor_rules::core::text::{canonical, same_word};
use parlor_rules::games::digits::score;
use parlor_rules::games::motus::{LetterColor, color};
use parlor_rules::games::sea_battle::{Coord, fleet_is_separated, place_fleet, standard_layout};
use parlor_rules::{PlayerId, TurnCursor};
use proptest::prelude::*;

fn code(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(0u8..10, len)
        .prop_map(|d| d.iter().map(|x| char::from(b'0' + x)).collect())
}

fn word(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(b'A'..=b'F', len)
        .prop_map(|b| b.into_iter().map(char::from).collect())
}

proptest! {
    /// Property: place matches never exceed digit matches, which never
    /// exceed the code length.
    #[test]
    fn prop_feedback_is_bounded((secret, guess) in (4usize..=6).prop_flat_map(|n| (code(n), code(n)))) {
        let feedback = score(&secret, &guess);
        prop_assert!(feedback.correct_place <= feedback.correct_digits);
        prop_assert!(feedback.correct_digits <= secret.len());
    }

    /// Property: a code scored against itself is fully correct.
    #[test]
    fn prop_feedback_self_match(secret in code(5)) {
        let feedback = score(&secret, &secret);
        prop_assert_eq!(feedback.correct_place, 5);
        prop_assert_eq!(feedback.correct_digits, 5);
    }

    /// Property: exact colors are exactly the positional matches, and no
    /// letter is colored more often than it occurs in the target.
    #[test]
    fn prop_coloring_respects_letter_counts((target, guess) in (2usize..=8).prop_flat_map(|n| (word(n), word(n)))) {
        let row = color(&target, &guess);
        prop_assert_eq!(row.len(), guess.len());
        for (i, (t, g)) in target.chars().zip(guess.chars()).enumerate() {
            prop_assert_eq!(row[i].color == LetterColor::Exact, t == g);
        }
        for letter in 'A'..='F' {
            let colored = row
                .iter()
                .filter(|r| r.letter == letter && r.color != LetterColor::Absent)
                .count();
            let available = target.chars().filter(|c| *c == letter).count();
            prop_assert!(colored <= available);
        }
    }

    /// Property: canonical form is stable and ignores case.
    #[test]
    fn prop_canonical_is_idempotent(raw in "[a-zA-Zéèàç]{2,12}") {
        let once = canonical(&raw);
        prop_assert_eq!(canonical(&once), once.clone());
        prop_assert!(same_word(&raw, &raw.to_uppercase()));
        prop_assert!(once.chars().all(|c| c.is_ascii_uppercase()));
    }

    /// Property: the cursor always lands on `passes mod seats`.
    #[test]
    fn prop_cursor_wraps(seats in 1usize..8, passes in 0usize..50) {
        let mut cursor = TurnCursor::new(seats);
        for _ in 0..passes {
            cursor.pass();
            prop_assert!(cursor.in_range());
        }
        prop_assert_eq!(cursor.index(), passes % seats);
    }

    /// Property: the standard fleet shifted down stays legal and separated.
    #[test]
    fn prop_shifted_fleet_is_separated(shift in 0i32..=3) {
        let ships: Vec<_> = standard_layout()
            .into_iter()
            .map(|mut ship| {
                ship.cells = ship.cells.iter().map(|c| Coord::new(c.row + shift, c.col)).collect();
                ship
            })
            .collect();
        let fleet = place_fleet(&PlayerId::from("ann"), &ships).unwrap();
        prop_assert!(fleet_is_separated(&fleet));
    }

    /// Property: moving the first submarine onto another ship is refused.
    #[test]
    fn prop_overlapping_fleet_is_refused(index in 0usize..4) {
        let mut ships = standard_layout();
        let target = ships[index].cells[0];
        let last = ships.len() - 1;
        ships[last].cells = vec![target];
        prop_assert!(place_fleet(&PlayerId::from("ann"), &ships).is_err());
    }
}
