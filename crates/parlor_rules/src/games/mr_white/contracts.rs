//! Mr White preconditions, resolver and projection.

use super::action::{AcceptedMrWhiteMove, MrWhiteMove, MrWhiteReport, TallyOutcome};
use super::invariants::MrWhiteInvariants;
use super::types::{
    Clue, MAX_CLUE_LEN, MIN_PLAYERS, MrWhitePhase, MrWhitePublic, MrWhiteSecrets, MrWhiteView,
    Role, VoteTally,
};
use crate::core::text::{MIN_WORD_LEN, canonical, same_word};
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, NoSetup, PlayerId, Roster, Snapshot,
    Table, Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// The Mr White variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrWhite;

impl MrWhite {
    /// Creates a game around a sourced word and picks Mr White with `rng`.
    #[instrument(skip(players, word, rng), fields(players = players.len()))]
    pub fn create(
        players: Vec<PlayerId>,
        word: &str,
        rng: &mut impl Rng,
    ) -> Result<Table<MrWhite>, GameError> {
        let roster = Roster::with_bounds(players, MIN_PLAYERS, None)?;
        let word = canonical(word);
        if word.chars().count() < MIN_WORD_LEN {
            warn!("Sourced word unusable");
            return Err(GameError::SourceUnavailable {
                reason: "sourced word has no usable letters".to_string(),
            });
        }
        let seat = rng.random_range(0..roster.len());
        let mr_white = roster.ids()[seat].clone();
        info!(word_length = word.chars().count(), "Mr White game created");
        Ok(Table::fresh(
            MrWhitePublic::new(roster),
            MrWhiteSecrets {
                word: Some(word),
                mr_white: Some(mr_white),
                ballots: BTreeMap::new(),
            },
        ))
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the actor has not been voted out.
pub struct StillActive;

impl StillActive {
    /// Checks `actor`.
    pub fn check(public: &MrWhitePublic, actor: &PlayerId) -> Result<(), GameError> {
        if public.is_active(actor) {
            Ok(())
        } else {
            Err(GameError::invalid(format!("{actor} has been eliminated")))
        }
    }
}

/// Precondition: a clue is 1-40 characters after trimming and does not give
/// the word away.
pub struct HonestClue;

impl HonestClue {
    /// Returns the trimmed clue.
    pub fn check(raw: &str, word: &str) -> Result<String, GameError> {
        let clue = raw.trim();
        let len = clue.chars().count();
        if len == 0 || len > MAX_CLUE_LEN {
            return Err(GameError::invalid(format!(
                "clue must be 1-{MAX_CLUE_LEN} characters"
            )));
        }
        if canonical(clue).contains(word) {
            return Err(GameError::invalid("clue must not contain the word"));
        }
        Ok(clue.to_string())
    }
}

/// Precondition: one ballot per round, for another active player.
pub struct FairBallot;

impl FairBallot {
    /// Checks a ballot from `voter` against `target`.
    pub fn check(
        public: &MrWhitePublic,
        voter: &PlayerId,
        target: &PlayerId,
    ) -> Result<(), GameError> {
        if !public.is_active(target) {
            return Err(GameError::invalid(format!(
                "{target} is not an active player"
            )));
        }
        if target == voter {
            return Err(GameError::invalid("cannot vote for yourself"));
        }
        if public.has_voted(voter) {
            return Err(GameError::duplicate("vote this round"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Tally
// ─────────────────────────────────────────────────────────────

/// Counts ballots; the unique top vote-getter is eliminated.
fn tally(round: usize, ballots: BTreeMap<PlayerId, PlayerId>) -> VoteTally {
    let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
    for target in ballots.values() {
        *counts.entry(target.clone()).or_default() += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, n)| **n == top).map(|(p, _)| p);
    let eliminated = match (leaders.next(), leaders.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    };
    VoteTally {
        round,
        ballots,
        counts,
        eliminated,
    }
}

fn civilians(public: &MrWhitePublic, mr_white: &PlayerId) -> Winner {
    Winner::Team(
        public
            .roster()
            .iter()
            .filter(|p| *p != mr_white)
            .cloned()
            .collect(),
    )
}

fn start_clue_round(public: &mut MrWhitePublic) -> Result<(), GameError> {
    let round = public.rounds_played();
    transition(public.phase_mut(), MrWhitePhase::Clues { round })?;
    public.restart_clues();
    Ok(())
}

/// Applies a closed vote to the game.
fn close_vote(
    public: &mut MrWhitePublic,
    secrets: &mut MrWhiteSecrets,
) -> Result<(VoteTally, TallyOutcome), GameError> {
    let mr_white = secrets.mr_white.clone().ok_or(GameError::SecretsMissing)?;
    let word = secrets.word.clone().ok_or(GameError::SecretsMissing)?;
    let result = tally(public.rounds_played(), std::mem::take(&mut secrets.ballots));
    public.close_vote(result.clone());

    let Some(out) = result.eliminated.clone() else {
        info!(round = result.round, "Vote tied, new clue round");
        start_clue_round(public)?;
        return Ok((result, TallyOutcome::Tie));
    };

    let role = if out == mr_white {
        Role::MrWhite
    } else {
        Role::Civilian
    };
    public.eliminate(&out, role);
    info!(player = %out, %role, "Player eliminated");

    match role {
        Role::MrWhite => {
            public.reveal_mr_white(mr_white);
            transition(public.phase_mut(), MrWhitePhase::LastGuess)?;
        }
        Role::Civilian if public.active().len() <= 2 => {
            transition(
                public.phase_mut(),
                MrWhitePhase::Ended {
                    winner: Winner::Player(mr_white.clone()),
                },
            )?;
            public.reveal_mr_white(mr_white);
            public.reveal_word(word);
        }
        Role::Civilian => start_clue_round(public)?,
    }
    Ok((result, TallyOutcome::Eliminated { player: out, role }))
}

// ─────────────────────────────────────────────────────────────
//  Variant
// ─────────────────────────────────────────────────────────────

impl Variant for MrWhite {
    const NAME: &'static str = "mr_white";

    type Public = MrWhitePublic;
    type Secrets = MrWhiteSecrets;
    type Setup = NoSetup;
    type AcceptedSetup = NoSetup;
    type Move = MrWhiteMove;
    type AcceptedMove = AcceptedMrWhiteMove;
    type Report = MrWhiteReport;
    type View = MrWhiteView;

    fn check_setup(
        _public: &MrWhitePublic,
        _secrets: &MrWhiteSecrets,
        _actor: &PlayerId,
        setup: &NoSetup,
    ) -> Result<NoSetup, GameError> {
        match *setup {}
    }

    fn resolve_setup(
        _public: &mut MrWhitePublic,
        _secrets: &mut MrWhiteSecrets,
        _actor: &PlayerId,
        accepted: NoSetup,
        _now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        match accepted {}
    }

    fn check_move(
        public: &MrWhitePublic,
        secrets: &MrWhiteSecrets,
        actor: &PlayerId,
        action: &MrWhiteMove,
    ) -> Result<AcceptedMrWhiteMove, GameError> {
        match action {
            MrWhiteMove::Clue { text } => {
                if public.clue_round().is_none() {
                    return Err(wrong_phase(public.phase(), "clue"));
                }
                seated_on_turn(public, actor, true)?;
                let word = secrets.word.as_deref().ok_or(GameError::SecretsMissing)?;
                HonestClue::check(text, word).map(AcceptedMrWhiteMove::Clue)
            }
            MrWhiteMove::StartVoting => {
                if public.phase() != &MrWhitePhase::Discussion {
                    return Err(wrong_phase(public.phase(), "start voting"));
                }
                seated_on_turn(public, actor, false)?;
                StillActive::check(public, actor)?;
                Ok(AcceptedMrWhiteMove::StartVoting)
            }
            MrWhiteMove::Vote { target } => {
                if public.phase() != &MrWhitePhase::Voting {
                    return Err(wrong_phase(public.phase(), "vote"));
                }
                seated_on_turn(public, actor, false)?;
                StillActive::check(public, actor)?;
                FairBallot::check(public, actor, target)?;
                Ok(AcceptedMrWhiteMove::Vote(target.clone()))
            }
            MrWhiteMove::Guess { word } => {
                if public.phase() != &MrWhitePhase::LastGuess {
                    return Err(wrong_phase(public.phase(), "guess"));
                }
                seated_on_turn(public, actor, true)?;
                let guess = word.trim();
                if guess.is_empty() {
                    return Err(GameError::invalid("guess must not be empty"));
                }
                Ok(AcceptedMrWhiteMove::Guess(guess.to_string()))
            }
        }
    }

    fn resolve_move(
        public: &mut MrWhitePublic,
        secrets: &mut MrWhiteSecrets,
        actor: &PlayerId,
        accepted: AcceptedMrWhiteMove,
        _now: DateTime<Utc>,
    ) -> Result<MrWhiteReport, GameError> {
        match accepted {
            AcceptedMrWhiteMove::Clue(text) => {
                let round = public.clue_round().unwrap_or_default();
                let clue = Clue {
                    round,
                    player: actor.clone(),
                    text,
                };
                public.add_clue(clue.clone());
                let last = public.cursor_mut().index() + 1 == public.active().len();
                if last {
                    transition(public.phase_mut(), MrWhitePhase::Discussion)?;
                    public.cursor_mut().reset();
                } else {
                    public.cursor_mut().pass();
                }
                debug!(round, discussion_started = last, "Clue recorded");
                Ok(MrWhiteReport::Clue {
                    clue,
                    discussion_started: last,
                })
            }
            AcceptedMrWhiteMove::StartVoting => {
                transition(public.phase_mut(), MrWhitePhase::Voting)?;
                Ok(MrWhiteReport::VotingStarted)
            }
            AcceptedMrWhiteMove::Vote(target) => {
                secrets.ballots.insert(actor.clone(), target);
                public.mark_voted(actor);
                let all_in = public.voted().len() == public.active().len();
                debug!(votes = public.voted().len(), all_in, "Ballot cast");
                let (tally, outcome) = if all_in {
                    let (t, o) = close_vote(public, secrets)?;
                    (Some(t), Some(o))
                } else {
                    (None, None)
                };
                Ok(MrWhiteReport::Vote {
                    voter: actor.clone(),
                    tally,
                    outcome,
                })
            }
            AcceptedMrWhiteMove::Guess(guess) => {
                let word = secrets.word.clone().ok_or(GameError::SecretsMissing)?;
                let mr_white = secrets.mr_white.clone().ok_or(GameError::SecretsMissing)?;
                let correct = same_word(&guess, &word);
                let winner = if correct {
                    Winner::Player(mr_white.clone())
                } else {
                    civilians(public, &mr_white)
                };
                public.set_last_guess(guess.clone());
                transition(public.phase_mut(), MrWhitePhase::Ended { winner })?;
                public.reveal_word(word);
                Ok(MrWhiteReport::LastGuess { guess, correct })
            }
        }
    }

    fn project(public: &MrWhitePublic, secrets: &MrWhiteSecrets, viewer: &PlayerId) -> MrWhiteView {
        let seated = public.roster().contains(viewer);
        let my_role = seated.then(|| secrets.role_of(viewer)).flatten();
        let my_word = match my_role {
            Some(Role::Civilian) => secrets.word.clone(),
            _ => None,
        };
        MrWhiteView {
            public: public.clone(),
            my_role,
            my_word,
            my_vote: secrets.ballots.get(viewer).cloned(),
        }
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        MrWhiteInvariants::check_all(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameErrorKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn id(name: &str) -> PlayerId {
        PlayerId::from(name)
    }

    fn players() -> Vec<PlayerId> {
        ["ann", "ben", "cat", "dan"].into_iter().map(id).collect()
    }

    /// A table whose Mr White is forced to `who`.
    fn table_with(who: &str) -> Table<MrWhite> {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut table = MrWhite::create(players(), "Pomme", &mut rng).unwrap();
        let mut secrets = table.secrets().unwrap().clone();
        secrets.mr_white = Some(id(who));
        table.inject_secrets(secrets).unwrap();
        table
    }

    fn play(
        table: &mut Table<MrWhite>,
        who: &str,
        action: MrWhiteMove,
    ) -> Result<MrWhiteReport, GameError> {
        table.apply_move(&id(who), action, now())
    }

    fn clue(text: &str) -> MrWhiteMove {
        MrWhiteMove::Clue { text: text.into() }
    }

    fn vote(target: &str) -> MrWhiteMove {
        MrWhiteMove::Vote { target: id(target) }
    }

    fn clue_round(table: &mut Table<MrWhite>) {
        let order: Vec<String> = table
            .public()
            .active()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        for who in order {
            play(table, &who, clue("fruit")).unwrap();
        }
        play(table, "ann", MrWhiteMove::StartVoting)
            .or_else(|_| play(table, "ben", MrWhiteMove::StartVoting))
            .unwrap();
    }

    #[test]
    fn test_create_picks_one_mr_white() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = MrWhite::create(players(), "pomme", &mut rng).unwrap();
        let secrets = table.secrets().unwrap();
        assert!(players().contains(secrets.mr_white.as_ref().unwrap()));
        assert_eq!(secrets.word.as_deref(), Some("POMME"));
        assert!(table.public().mr_white().is_none());
        assert!(table.public().word().is_none());
    }

    #[test]
    fn test_create_needs_three_players() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = MrWhite::create(vec![id("ann"), id("ben")], "pomme", &mut rng).unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidRoster);
    }

    #[test]
    fn test_clues_follow_seat_order() {
        let mut table = table_with("dan");
        assert_eq!(
            play(&mut table, "ben", clue("red")).unwrap_err().kind(),
            GameErrorKind::NotYourTurn
        );
        play(&mut table, "ann", clue("red")).unwrap();
        assert_eq!(table.public().current_player(), Some(&id("ben")));
    }

    #[test]
    fn test_clue_rules() {
        let mut table = table_with("dan");
        for bad in [
            "   ",
            "a clue that is much too long to be accepted here",
            "une pommé",
        ] {
            assert_eq!(
                play(&mut table, "ann", clue(bad)).unwrap_err().kind(),
                GameErrorKind::InvalidPayload,
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_last_clue_opens_discussion() {
        let mut table = table_with("dan");
        for who in ["ann", "ben", "cat"] {
            play(&mut table, who, clue("fruit")).unwrap();
        }
        let report = play(&mut table, "dan", clue("round")).unwrap();
        assert!(matches!(
            report,
            MrWhiteReport::Clue {
                discussion_started: true,
                ..
            }
        ));
        assert_eq!(table.public().phase(), &MrWhitePhase::Discussion);
        assert_eq!(
            play(&mut table, "ann", vote("dan")).unwrap_err().kind(),
            GameErrorKind::WrongPhase
        );
    }

    #[test]
    fn test_ballots_stay_secret_until_tally() {
        let mut table = table_with("dan");
        clue_round(&mut table);
        play(&mut table, "ann", vote("dan")).unwrap();
        assert_eq!(
            play(&mut table, "ann", vote("ben")).unwrap_err().kind(),
            GameErrorKind::Duplicate
        );
        assert_eq!(
            play(&mut table, "ben", vote("ben")).unwrap_err().kind(),
            GameErrorKind::InvalidPayload
        );
        let json = serde_json::to_string(table.public()).unwrap();
        assert!(!json.contains("ballots"));
        assert_eq!(table.view_for(&id("ann")).my_vote, Some(id("dan")));
        assert_eq!(table.view_for(&id("ben")).my_vote, None);
        assert_eq!(table.public().voted(), &vec![id("ann")]);
    }

    #[test]
    fn test_tie_starts_new_round() {
        let mut table = table_with("dan");
        clue_round(&mut table);
        play(&mut table, "ann", vote("ben")).unwrap();
        play(&mut table, "ben", vote("ann")).unwrap();
        play(&mut table, "cat", vote("dan")).unwrap();
        let report = play(&mut table, "dan", vote("cat")).unwrap();
        assert!(matches!(
            report,
            MrWhiteReport::Vote {
                outcome: Some(TallyOutcome::Tie),
                ..
            }
        ));
        assert_eq!(table.public().phase(), &MrWhitePhase::Clues { round: 1 });
        assert_eq!(table.public().active().len(), 4);
        assert_eq!(table.public().current_player(), Some(&id("ann")));
        assert!(table.secrets().unwrap().ballots.is_empty());
    }

    #[test]
    fn test_caught_mr_white_guesses_right() {
        let mut table = table_with("dan");
        clue_round(&mut table);
        for who in ["ann", "ben", "cat"] {
            play(&mut table, who, vote("dan")).unwrap();
        }
        play(&mut table, "dan", vote("ann")).unwrap();
        assert_eq!(table.public().phase(), &MrWhitePhase::LastGuess);
        assert_eq!(table.public().mr_white().as_ref(), Some(&id("dan")));
        assert_eq!(table.public().current_player(), Some(&id("dan")));
        assert_eq!(
            play(
                &mut table,
                "ann",
                MrWhiteMove::Guess {
                    word: "pomme".into()
                }
            )
            .unwrap_err()
            .kind(),
            GameErrorKind::NotYourTurn
        );
        play(
            &mut table,
            "dan",
            MrWhiteMove::Guess {
                word: "pommé".into(),
            },
        )
        .unwrap();
        assert_eq!(table.winner(), Some(&Winner::Player(id("dan"))));
        assert_eq!(table.public().word().as_deref(), Some("POMME"));
    }

    #[test]
    fn test_caught_mr_white_guesses_wrong() {
        let mut table = table_with("dan");
        clue_round(&mut table);
        for who in ["ann", "ben", "cat"] {
            play(&mut table, who, vote("dan")).unwrap();
        }
        play(&mut table, "dan", vote("ann")).unwrap();
        play(
            &mut table,
            "dan",
            MrWhiteMove::Guess {
                word: "poire".into(),
            },
        )
        .unwrap();
        let winner = table.winner().unwrap();
        assert_eq!(winner, &Winner::Team(vec![id("ann"), id("ben"), id("cat")]));
        assert!(!winner.includes(&id("dan")));
    }

    #[test]
    fn test_mr_white_wins_when_two_remain() {
        let mut table = table_with("dan");
        clue_round(&mut table);
        for who in ["ann", "ben", "dan"] {
            play(&mut table, who, vote("cat")).unwrap();
        }
        play(&mut table, "cat", vote("ann")).unwrap();
        assert_eq!(table.public().phase(), &MrWhitePhase::Clues { round: 1 });
        assert_eq!(
            play(&mut table, "cat", clue("late")).unwrap_err().kind(),
            GameErrorKind::NotYourTurn
        );

        clue_round(&mut table);
        assert_eq!(
            play(&mut table, "cat", vote("ann")).unwrap_err().kind(),
            GameErrorKind::InvalidPayload
        );
        play(&mut table, "ann", vote("ben")).unwrap();
        play(&mut table, "ben", vote("dan")).unwrap();
        play(&mut table, "dan", vote("ben")).unwrap();
        assert_eq!(table.winner(), Some(&Winner::Player(id("dan"))));
        assert_eq!(table.public().word().as_deref(), Some("POMME"));
        assert_eq!(table.public().mr_white().as_ref(), Some(&id("dan")));
        assert_eq!(table.public().eliminated().len(), 2);
    }

    #[test]
    fn test_views_hide_word_from_mr_white() {
        let table = table_with("dan");
        let civilian = table.view_for(&id("ann"));
        assert_eq!(civilian.my_role, Some(Role::Civilian));
        assert_eq!(civilian.my_word.as_deref(), Some("POMME"));
        let mr_white = table.view_for(&id("dan"));
        assert_eq!(mr_white.my_role, Some(Role::MrWhite));
        assert!(mr_white.my_word.is_none());
        let stranger = table.view_for(&id("eve"));
        assert!(stranger.my_role.is_none() && stranger.my_word.is_none());
        let json = serde_json::to_string(&mr_white).unwrap();
        assert!(!json.contains("POMME"));
    }
}
