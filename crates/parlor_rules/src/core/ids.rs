//! Player identity and seating order.

use super::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// Opaque identifier of a seated player.
///
/// Identity is owned by the caller; the engine only compares ids.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates a player id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Ordered list of distinct players, fixed for the lifetime of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct Roster {
    seats: Vec<PlayerId>,
}

impl Roster {
    /// Builds a roster, rejecting fewer than two seats or repeated ids.
    #[instrument(skip(seats), fields(seats = seats.len()))]
    pub fn new(seats: Vec<PlayerId>) -> Result<Self, GameError> {
        if seats.len() < 2 {
            return Err(GameError::InvalidRoster {
                reason: format!("need at least 2 players, got {}", seats.len()),
            });
        }
        let distinct: BTreeSet<&PlayerId> = seats.iter().collect();
        if distinct.len() != seats.len() {
            return Err(GameError::InvalidRoster {
                reason: "player ids must be distinct".to_string(),
            });
        }
        Ok(Self { seats })
    }

    /// Builds a roster and checks the seat count against a variant's bounds.
    pub fn with_bounds(
        seats: Vec<PlayerId>,
        min: usize,
        max: Option<usize>,
    ) -> Result<Self, GameError> {
        let roster = Self::new(seats)?;
        let n = roster.len();
        if n < min || max.is_some_and(|max| n > max) {
            let expected = match max {
                Some(max) if max == min => format!("exactly {min}"),
                Some(max) => format!("{min}-{max}"),
                None => format!("at least {min}"),
            };
            return Err(GameError::InvalidRoster {
                reason: format!("this game needs {expected} players, got {n}"),
            });
        }
        Ok(roster)
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Always false; a roster has at least two seats.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Player at a seat index.
    pub fn get(&self, index: usize) -> Option<&PlayerId> {
        self.seats.get(index)
    }

    /// Seat index of a player.
    pub fn index_of(&self, player: &PlayerId) -> Option<usize> {
        self.seats.iter().position(|p| p == player)
    }

    /// Returns true if the player is seated.
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.seats.contains(player)
    }

    /// Seats in order.
    pub fn ids(&self) -> &[PlayerId] {
        &self.seats
    }

    /// Iterates seats in order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.seats.iter()
    }

    /// Player seated after `index`, wrapping around.
    pub fn next_after(&self, index: usize) -> &PlayerId {
        &self.seats[(index + 1) % self.seats.len()]
    }

    /// The other player of a two-seat roster.
    pub fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        self.index_of(player).map(|i| self.next_after(i))
    }
}

impl TryFrom<Vec<PlayerId>> for Roster {
    type Error = GameError;

    fn try_from(seats: Vec<PlayerId>) -> Result<Self, Self::Error> {
        Self::new(seats)
    }
}

impl From<Roster> for Vec<PlayerId> {
    fn from(roster: Roster) -> Self {
        roster.seats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| PlayerId::from(*n)).collect()
    }

    #[test]
    fn test_roster_rejects_single_player() {
        assert!(matches!(
            Roster::new(ids(&["alice"])),
            Err(GameError::InvalidRoster { .. })
        ));
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        assert!(Roster::new(ids(&["alice", "alice"])).is_err());
    }

    #[test]
    fn test_roster_bounds() {
        assert!(Roster::with_bounds(ids(&["a", "b", "c"]), 2, Some(2)).is_err());
        assert!(Roster::with_bounds(ids(&["a", "b"]), 3, None).is_err());
        assert!(Roster::with_bounds(ids(&["a", "b", "c"]), 3, None).is_ok());
    }

    #[test]
    fn test_next_after_wraps() {
        let roster = Roster::new(ids(&["a", "b", "c"])).unwrap();
        assert_eq!(roster.next_after(2).as_str(), "a");
        assert_eq!(roster.opponent_of(&"a".into()).unwrap().as_str(), "b");
    }

    #[test]
    fn test_roster_serializes_as_list() {
        let roster = Roster::new(ids(&["a", "b"])).unwrap();
        let json = serde_json::to_string(&roster).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        assert!(serde_json::from_str::<Roster>(r#"["a"]"#).is_err());
    }
}
