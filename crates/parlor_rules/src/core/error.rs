//! Rejection taxonomy shared by every variant.
//!
//! Every error here rejects a single operation and leaves the instance
//! untouched; none of them poisons a game.

use super::ids::PlayerId;
use serde::{Deserialize, Serialize};

/// Error returned when a setup, move, or creation request is rejected.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, strum::EnumDiscriminants,
)]
#[strum_discriminants(name(GameErrorKind))]
#[strum_discriminants(derive(Hash, Serialize, Deserialize, strum::Display))]
#[strum_discriminants(serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum_discriminants(strum(serialize_all = "SCREAMING_SNAKE_CASE"))]
pub enum GameError {
    /// The operation does not belong to the current phase.
    #[display("{action} is not allowed during {phase}")]
    WrongPhase {
        /// What was attempted.
        action: &'static str,
        /// The phase the game is in.
        phase: &'static str,
    },

    /// The actor is not seated in this game.
    #[display("{player} is not a player in this game")]
    NotAPlayer {
        /// The unknown actor.
        player: PlayerId,
    },

    /// A turn-gated move came from someone other than the current player.
    #[display("it is {expected}'s turn, not {player}'s")]
    NotYourTurn {
        /// The actor.
        player: PlayerId,
        /// Whose turn it is.
        expected: PlayerId,
    },

    /// The payload is malformed or outside the variant's rules.
    #[display("invalid payload: {reason}")]
    InvalidPayload {
        /// Why the payload was refused.
        reason: String,
    },

    /// The payload repeats something already recorded.
    #[display("duplicate: {what}")]
    Duplicate {
        /// What was repeated.
        what: String,
    },

    /// The game has ended; nothing more is accepted.
    #[display("the game is already over")]
    AlreadyOver,

    /// The word source failed, so the game could not be created.
    #[display("word source unavailable: {reason}")]
    SourceUnavailable {
        /// Source failure description.
        reason: String,
    },

    /// Secrets were not re-injected after a restore.
    #[display("secrets have not been restored for this game")]
    SecretsMissing,

    /// The player list does not fit the variant.
    #[display("invalid roster: {reason}")]
    InvalidRoster {
        /// Why the roster was refused.
        reason: String,
    },

    /// A postcondition failed after resolution (a bug, never expected).
    #[display("invariant violation: {description}")]
    InvariantViolation {
        /// The violated invariants.
        description: String,
    },
}

impl GameError {
    /// Returns the discriminant, suitable for a transport-level error code.
    pub fn kind(&self) -> GameErrorKind {
        GameErrorKind::from(self)
    }

    /// Shorthand for [`GameError::InvalidPayload`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`GameError::Duplicate`].
    pub fn duplicate(what: impl Into<String>) -> Self {
        Self::Duplicate { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_code() {
        let err = GameError::NotYourTurn {
            player: "bob".into(),
            expected: "alice".into(),
        };
        assert_eq!(err.kind(), GameErrorKind::NotYourTurn);
        assert_eq!(
            serde_json::to_string(&err.kind()).unwrap(),
            r#""NOT_YOUR_TURN""#
        );
        assert_eq!(GameErrorKind::AlreadyOver.to_string(), "ALREADY_OVER");
    }

    #[test]
    fn test_display_mentions_players() {
        let err = GameError::NotYourTurn {
            player: "bob".into(),
            expected: "alice".into(),
        };
        assert_eq!(err.to_string(), "it is alice's turn, not bob's");
    }

    #[test]
    fn test_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(GameError::SecretsMissing);
        assert!(err.source().is_none());
        assert_eq!(
            err.to_string(),
            "secrets have not been restored for this game"
        );
    }
}
