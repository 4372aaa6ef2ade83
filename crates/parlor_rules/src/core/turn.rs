//! Turn rotation and wall-clock turn deadlines.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Index of the player to move, always a valid seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnCursor {
    #[serde(rename = "current_player_index")]
    index: usize,
    seats: usize,
}

/// What a resolved move does to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEffect {
    /// Same player moves again.
    Continue,
    /// Next seat moves.
    Pass,
}

impl TurnCursor {
    /// Cursor at seat 0.
    pub fn new(seats: usize) -> Self {
        Self {
            index: 0,
            seats: seats.max(1),
        }
    }

    /// Current seat index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of seats the cursor rotates over.
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// Advances by one seat, wrapping.
    pub fn pass(&mut self) {
        self.index = (self.index + 1) % self.seats;
    }

    /// Applies a resolver's turn effect.
    pub fn apply(&mut self, effect: TurnEffect) {
        match effect {
            TurnEffect::Continue => {}
            TurnEffect::Pass => self.pass(),
        }
    }

    /// Back to seat 0 (used when play starts).
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Moves to a specific seat, clamped into range.
    pub fn seat(&mut self, index: usize) {
        self.index = index % self.seats;
    }

    /// Shrinks the rotation after a seat is removed, keeping the cursor valid.
    pub fn resize(&mut self, seats: usize) {
        self.seats = seats.max(1);
        self.index %= self.seats;
    }

    /// True while the cursor points at a valid seat.
    pub fn in_range(&self) -> bool {
        self.index < self.seats
    }
}

/// Turn start timestamp plus a fixed limit.
///
/// The engine never runs a timer; callers ask how much time is left and
/// schedule their own enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnClock {
    started_at: DateTime<Utc>,
    limit_ms: i64,
}

impl TurnClock {
    /// Starts a clock at `now`.
    pub fn start(now: DateTime<Utc>, limit: TimeDelta) -> Self {
        Self {
            started_at: now,
            limit_ms: limit.num_milliseconds(),
        }
    }

    /// When the turn started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The configured limit.
    pub fn limit(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.limit_ms)
    }

    /// The instant the turn expires.
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + self.limit()
    }

    /// Time left at `now`, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.deadline() - now).max(TimeDelta::zero())
    }

    /// True once `now` reaches the deadline.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_wraps() {
        let mut cursor = TurnCursor::new(3);
        cursor.pass();
        cursor.pass();
        cursor.pass();
        assert_eq!(cursor.index(), 0);
        cursor.apply(TurnEffect::Continue);
        assert_eq!(cursor.index(), 0);
        cursor.apply(TurnEffect::Pass);
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_resize_keeps_cursor_valid() {
        let mut cursor = TurnCursor::new(4);
        cursor.seat(3);
        cursor.resize(3);
        assert!(cursor.in_range());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_clock_remaining_clamps_at_zero() {
        let start = DateTime::from_timestamp(1_000, 0).unwrap();
        let clock = TurnClock::start(start, TimeDelta::seconds(60));
        assert_eq!(
            clock.remaining(start + TimeDelta::seconds(15)),
            TimeDelta::seconds(45)
        );
        assert_eq!(
            clock.remaining(start + TimeDelta::seconds(90)),
            TimeDelta::zero()
        );
        assert!(!clock.expired(start + TimeDelta::seconds(59)));
        assert!(clock.expired(start + TimeDelta::seconds(60)));
    }

    #[test]
    fn test_cursor_serializes_index_name() {
        let json = serde_json::to_value(TurnCursor::new(2)).unwrap();
        assert_eq!(json["current_player_index"], 0);
    }
}
