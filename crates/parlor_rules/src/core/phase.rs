//! Phase machine shared by every variant.
//!
//! Each variant declares its own phase enum and its transition table through
//! [`Lifecycle`]. The winner lives inside the terminal phase, so an ended
//! game always has an outcome and that outcome can never change.

use super::error::GameError;
use super::ids::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

/// Coarse stage every variant phase maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Collecting per-player secrets.
    Setup,
    /// Moves are being played.
    Play,
    /// Terminal.
    Ended,
}

/// Broadcast status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Setup or play.
    Playing,
    /// Terminal.
    Ended,
}

impl From<Stage> for Status {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Setup | Stage::Play => Status::Playing,
            Stage::Ended => Status::Ended,
        }
    }
}

/// Outcome of an ended game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// A single player won.
    Player(PlayerId),
    /// Nobody won.
    Tie,
    /// Several players won together.
    Team(Vec<PlayerId>),
}

impl Winner {
    /// Returns true if `player` is among the winners.
    pub fn includes(&self, player: &PlayerId) -> bool {
        match self {
            Winner::Player(p) => p == player,
            Winner::Tie => false,
            Winner::Team(team) => team.contains(player),
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Player(p) => write!(f, "{p} wins"),
            Winner::Tie => write!(f, "Tie"),
            Winner::Team(team) => {
                let names: Vec<&str> = team.iter().map(PlayerId::as_str).collect();
                write!(f, "{} win", names.join(", "))
            }
        }
    }
}

/// A variant phase enum with an explicit transition table.
pub trait Lifecycle: Clone + PartialEq + std::fmt::Debug {
    /// The coarse stage of this phase.
    fn stage(&self) -> Stage;

    /// Human-readable phase name, used in rejections.
    fn label(&self) -> &'static str;

    /// Transition table: may the game move from `self` to `next`?
    fn permits(&self, next: &Self) -> bool;

    /// The winner, present only in the terminal phase.
    fn winner(&self) -> Option<&Winner>;
}

/// Moves `current` to `next` if the transition table allows it.
///
/// Resolvers run on scratch copies, so a refused transition aborts the whole
/// move and nothing is committed.
#[instrument(level = "debug")]
pub fn transition<P: Lifecycle>(current: &mut P, next: P) -> Result<(), GameError> {
    if !current.permits(&next) {
        error!(
            from = current.label(),
            to = next.label(),
            "Illegal phase transition"
        );
        return Err(GameError::InvariantViolation {
            description: format!(
                "illegal transition from {} to {}",
                current.label(),
                next.label()
            ),
        });
    }
    *current = next;
    Ok(())
}

/// Rejects any operation once the phase is terminal, otherwise a mismatch.
pub fn wrong_phase<P: Lifecycle>(phase: &P, action: &'static str) -> GameError {
    if phase.stage() == Stage::Ended {
        GameError::AlreadyOver
    } else {
        GameError::WrongPhase {
            action,
            phase: phase.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Toy {
        Open,
        Done(Winner),
    }

    impl Lifecycle for Toy {
        fn stage(&self) -> Stage {
            match self {
                Toy::Open => Stage::Play,
                Toy::Done(_) => Stage::Ended,
            }
        }

        fn label(&self) -> &'static str {
            match self {
                Toy::Open => "open",
                Toy::Done(_) => "done",
            }
        }

        fn permits(&self, next: &Self) -> bool {
            matches!((self, next), (Toy::Open, Toy::Done(_)))
        }

        fn winner(&self) -> Option<&Winner> {
            match self {
                Toy::Done(w) => Some(w),
                Toy::Open => None,
            }
        }
    }

    #[test]
    fn test_terminal_phase_is_final() {
        let mut phase = Toy::Open;
        transition(&mut phase, Toy::Done(Winner::Tie)).unwrap();
        let again = transition(&mut phase, Toy::Done(Winner::Player("a".into())));
        assert!(matches!(again, Err(GameError::InvariantViolation { .. })));
        assert_eq!(phase.winner(), Some(&Winner::Tie));
    }

    #[test]
    fn test_wrong_phase_reports_already_over() {
        assert_eq!(
            wrong_phase(&Toy::Done(Winner::Tie), "guess"),
            GameError::AlreadyOver
        );
        assert!(matches!(
            wrong_phase(&Toy::Open, "setup"),
            GameError::WrongPhase {
                action: "setup",
                phase: "open"
            }
        ));
    }

    #[test]
    fn test_team_winner_includes_members() {
        let w = Winner::Team(vec!["a".into(), "b".into()]);
        assert!(w.includes(&"a".into()));
        assert!(!w.includes(&"c".into()));
        assert!(!Winner::Tie.includes(&"a".into()));
    }
}
