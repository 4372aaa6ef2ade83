//! Mr White state.

use crate::core::{CommonState, Lifecycle, PlayerId, Roster, Stage, TurnCursor, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest accepted clue, in characters.
pub const MAX_CLUE_LEN: usize = 40;

/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 3;

/// Mr White phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MrWhitePhase {
    /// Active players give one clue each, in seat order.
    Clues {
        /// Round number, from 0.
        round: usize,
    },
    /// Open talk until someone starts the vote.
    Discussion,
    /// Secret ballots.
    Voting,
    /// Mr White was caught and gets one guess at the word.
    LastGuess,
    /// Decided.
    Ended {
        /// Outcome.
        winner: Winner,
    },
}

impl Lifecycle for MrWhitePhase {
    fn stage(&self) -> Stage {
        match self {
            MrWhitePhase::Ended { .. } => Stage::Ended,
            _ => Stage::Play,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MrWhitePhase::Clues { .. } => "CLUES",
            MrWhitePhase::Discussion => "DISCUSSION",
            MrWhitePhase::Voting => "VOTING",
            MrWhitePhase::LastGuess => "LAST_GUESS",
            MrWhitePhase::Ended { .. } => "ENDED",
        }
    }

    fn permits(&self, next: &Self) -> bool {
        use MrWhitePhase::*;
        match (self, next) {
            (Clues { .. }, Discussion) | (Discussion, Voting) => true,
            (Voting, Clues { .. }) | (Voting, LastGuess) | (Voting, Ended { .. }) => true,
            (LastGuess, Ended { .. }) => true,
            _ => false,
        }
    }

    fn winner(&self) -> Option<&Winner> {
        match self {
            MrWhitePhase::Ended { winner } => Some(winner),
            _ => None,
        }
    }
}

/// A player's hidden role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Knows the word.
    Civilian,
    /// Does not know the word.
    MrWhite,
}

/// One clue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// Round the clue was given in.
    pub round: usize,
    /// Who gave it.
    pub player: PlayerId,
    /// Trimmed text.
    pub text: String,
}

/// Result of counting one round of ballots, published when counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Round the vote closed.
    pub round: usize,
    /// Every ballot, voter to target.
    pub ballots: BTreeMap<PlayerId, PlayerId>,
    /// Votes received per player.
    pub counts: BTreeMap<PlayerId, usize>,
    /// The unique top vote-getter, if any.
    pub eliminated: Option<PlayerId>,
}

/// An eliminated player and the role revealed with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    /// Who left.
    pub player: PlayerId,
    /// Their role.
    pub role: Role,
}

/// Broadcast-safe Mr White state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct MrWhitePublic {
    #[serde(rename = "player_ids")]
    #[getter(skip)]
    roster: Roster,
    #[getter(skip)]
    phase: MrWhitePhase,
    /// Cursor over `active`, not over the roster.
    #[getter(skip)]
    cursor: TurnCursor,
    /// Players still in, in seat order.
    active: Vec<PlayerId>,
    eliminated: Vec<Elimination>,
    clues: Vec<Clue>,
    /// Who has voted this round, never for whom.
    voted: Vec<PlayerId>,
    tallies: Vec<VoteTally>,
    /// Mr White's last guess, once made.
    last_guess: Option<String>,
    /// Mr White, published once caught or at the end.
    mr_white: Option<PlayerId>,
    /// The word, published at the end.
    word: Option<String>,
}

impl MrWhitePublic {
    pub(super) fn new(roster: Roster) -> Self {
        let active: Vec<PlayerId> = roster.ids().to_vec();
        let cursor = TurnCursor::new(active.len());
        Self {
            roster,
            phase: MrWhitePhase::Clues { round: 0 },
            cursor,
            active,
            eliminated: Vec::new(),
            clues: Vec::new(),
            voted: Vec::new(),
            tallies: Vec::new(),
            last_guess: None,
            mr_white: None,
            word: None,
        }
    }

    /// True if `player` is still in the game.
    pub fn is_active(&self, player: &PlayerId) -> bool {
        self.active.contains(player)
    }

    /// Current clue round, during the clue phase.
    pub fn clue_round(&self) -> Option<usize> {
        match self.phase {
            MrWhitePhase::Clues { round } => Some(round),
            _ => None,
        }
    }

    /// Number of completed clue rounds and votes, used to number the next
    /// clue round.
    pub fn rounds_played(&self) -> usize {
        self.tallies.len()
    }

    /// True once `player` has voted this round.
    pub fn has_voted(&self, player: &PlayerId) -> bool {
        self.voted.contains(player)
    }

    pub(super) fn phase_mut(&mut self) -> &mut MrWhitePhase {
        &mut self.phase
    }

    pub(super) fn cursor_mut(&mut self) -> &mut TurnCursor {
        &mut self.cursor
    }

    pub(super) fn add_clue(&mut self, clue: Clue) {
        self.clues.push(clue);
    }

    pub(super) fn mark_voted(&mut self, player: &PlayerId) {
        self.voted.push(player.clone());
    }

    pub(super) fn close_vote(&mut self, tally: VoteTally) {
        self.voted.clear();
        self.tallies.push(tally);
    }

    /// Removes `player` from the rotation and records their role.
    pub(super) fn eliminate(&mut self, player: &PlayerId, role: Role) {
        self.active.retain(|p| p != player);
        self.eliminated.push(Elimination {
            player: player.clone(),
            role,
        });
        self.cursor.resize(self.active.len());
    }

    /// Starts a clue round from the first active seat.
    pub(super) fn restart_clues(&mut self) {
        self.cursor.resize(self.active.len());
        self.cursor.reset();
    }

    pub(super) fn set_last_guess(&mut self, guess: String) {
        self.last_guess = Some(guess);
    }

    pub(super) fn reveal_mr_white(&mut self, player: PlayerId) {
        self.mr_white = Some(player);
    }

    pub(super) fn reveal_word(&mut self, word: String) {
        self.word = Some(word);
    }
}

impl CommonState for MrWhitePublic {
    type Phase = MrWhitePhase;

    fn roster(&self) -> &Roster {
        &self.roster
    }

    fn phase(&self) -> &MrWhitePhase {
        &self.phase
    }

    fn cursor(&self) -> Option<&TurnCursor> {
        Some(&self.cursor)
    }

    fn log_len(&self) -> usize {
        self.clues.len() + self.tallies.len() + usize::from(self.last_guess.is_some())
    }

    fn current_player(&self) -> Option<&PlayerId> {
        match self.phase {
            MrWhitePhase::Clues { .. } => self.active.get(self.cursor.index()),
            MrWhitePhase::LastGuess => self.mr_white.as_ref(),
            _ => None,
        }
    }
}

/// Server-only Mr White secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrWhiteSecrets {
    /// The civilians' word, canonical uppercase.
    pub word: Option<String>,
    /// Who plays Mr White.
    pub mr_white: Option<PlayerId>,
    /// Ballots of the running vote, voter to target.
    pub ballots: BTreeMap<PlayerId, PlayerId>,
}

impl MrWhiteSecrets {
    /// Role of `player`, if roles are known.
    pub fn role_of(&self, player: &PlayerId) -> Option<Role> {
        self.mr_white.as_ref().map(|mw| {
            if mw == player {
                Role::MrWhite
            } else {
                Role::Civilian
            }
        })
    }
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrWhiteView {
    /// The public state, verbatim.
    #[serde(flatten)]
    pub public: MrWhitePublic,
    /// The viewer's role, for seated players.
    pub my_role: Option<Role>,
    /// The word, for civilians only.
    pub my_word: Option<String>,
    /// The viewer's ballot in the running vote.
    pub my_vote: Option<PlayerId>,
}
