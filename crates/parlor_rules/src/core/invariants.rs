//! State and step invariants, checked as postconditions in debug builds.
//!
//! A state invariant looks at one state. A step invariant compares the state
//! before a resolved move with the state after it.

use super::phase::{Lifecycle, Stage};
use super::state::CommonState;

/// A property of a single state.
pub trait Invariant<S: ?Sized> {
    /// True if `state` satisfies the property.
    fn holds(state: &S) -> bool;

    /// Shown when the property fails.
    fn description() -> &'static str;
}

/// A property of one transition.
pub trait StepInvariant<S: ?Sized> {
    /// True if going from `before` to `after` satisfies the property.
    fn holds(before: &S, after: &S) -> bool;

    /// Shown when the property fails.
    fn description() -> &'static str;
}

/// A failed invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// What failed.
    pub description: String,
}

impl InvariantViolation {
    /// Wraps a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Joins violations into one message.
pub fn describe(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(|v| v.description.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn collect(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    collect(violations)
}

/// Invariants checked together; every failure is reported, not just the
/// first.
pub trait InvariantSet<S: ?Sized> {
    /// Checks every member against `state`.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! invariant_tuple {
    ($($member:ident),+) => {
        impl<S: ?Sized, $($member: Invariant<S>),+> InvariantSet<S> for ($($member,)+) {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let mut violations = Vec::new();
                $(
                    if !$member::holds(state) {
                        violations.push(InvariantViolation::new($member::description()));
                    }
                )+
                collect(violations)
            }
        }
    };
}

invariant_tuple!(A);
invariant_tuple!(A, B);
invariant_tuple!(A, B, C);

// ─────────────────────────────────────────────────────────────
//  Shared invariants
// ─────────────────────────────────────────────────────────────

/// Invariant: the turn cursor is a valid seat index.
pub struct CursorInRange;

impl<S: CommonState> Invariant<S> for CursorInRange {
    fn holds(state: &S) -> bool {
        match state.cursor() {
            Some(cursor) => cursor.in_range() && cursor.seats() <= state.roster().len(),
            None => true,
        }
    }

    fn description() -> &'static str {
        "Turn cursor indexes a valid seat"
    }
}

/// Invariant: the move log never shrinks.
pub struct AppendOnlyLog;

impl<S: CommonState> StepInvariant<S> for AppendOnlyLog {
    fn holds(before: &S, after: &S) -> bool {
        after.log_len() >= before.log_len()
    }

    fn description() -> &'static str {
        "Move log is append-only"
    }
}

/// Invariant: stages only move forward, and an ended game never changes.
pub struct ForwardStages;

impl<S: CommonState> StepInvariant<S> for ForwardStages {
    fn holds(before: &S, after: &S) -> bool {
        let rank = |stage: Stage| match stage {
            Stage::Setup => 0,
            Stage::Play => 1,
            Stage::Ended => 2,
        };
        let (from, to) = (before.phase().stage(), after.phase().stage());
        if from == Stage::Ended {
            return before.phase() == after.phase();
        }
        rank(to) >= rank(from)
    }

    fn description() -> &'static str {
        "Stages only move forward and the ended phase is final"
    }
}

/// Shared state invariants checked after every move.
pub type SharedInvariants = (CursorInRange,);

/// Checks the shared step invariants across one transition.
pub fn check_step<S: CommonState>(before: &S, after: &S) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();
    if !<AppendOnlyLog as StepInvariant<S>>::holds(before, after) {
        violations.push(InvariantViolation::new(<AppendOnlyLog as StepInvariant<
            S,
        >>::description()));
    }
    if !<ForwardStages as StepInvariant<S>>::holds(before, after) {
        violations.push(InvariantViolation::new(<ForwardStages as StepInvariant<
            S,
        >>::description()));
    }
    collect(violations)
}
