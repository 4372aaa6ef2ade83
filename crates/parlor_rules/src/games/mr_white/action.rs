//! Mr White moves and reports.

use super::types::{Clue, Role, VoteTally};
use crate::core::PlayerId;
use serde::{Deserialize, Serialize};

/// Mr White moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MrWhiteMove {
    /// Give a clue on your turn.
    Clue {
        /// 1-40 characters, must not contain the word.
        text: String,
    },
    /// Close the discussion and open voting.
    StartVoting,
    /// Vote for another active player.
    Vote {
        /// Who to eliminate.
        target: PlayerId,
    },
    /// Mr White's last guess at the word.
    Guess {
        /// The guessed word.
        word: String,
    },
}

/// A validated move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptedMrWhiteMove {
    /// Trimmed clue text.
    Clue(String),
    /// Open voting.
    StartVoting,
    /// Ballot target.
    Vote(PlayerId),
    /// Trimmed guess.
    Guess(String),
}

/// What a tally did to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TallyOutcome {
    /// No unique top vote; a new clue round starts.
    Tie,
    /// A player was eliminated.
    Eliminated {
        /// Who.
        player: PlayerId,
        /// Their revealed role.
        role: Role,
    },
}

/// Result of a resolved move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MrWhiteReport {
    /// A clue was recorded.
    Clue {
        /// The clue.
        clue: Clue,
        /// True if it was the round's last clue.
        discussion_started: bool,
    },
    /// Voting opened.
    VotingStarted,
    /// A ballot was cast.
    Vote {
        /// Who voted.
        voter: PlayerId,
        /// Set when the ballot closed the vote.
        tally: Option<VoteTally>,
        /// Set when the ballot closed the vote.
        outcome: Option<TallyOutcome>,
    },
    /// Mr White guessed.
    LastGuess {
        /// The guess.
        guess: String,
        /// True if it matched the word.
        correct: bool,
    },
}
