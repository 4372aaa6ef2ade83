//! Chains preconditions, resolver, timeout and projection.

use super::action::{AcceptedChainGuess, AcceptedWords, ChainGuess, ChainWords, ChainsReport};
use super::invariants::ChainsInvariants;
use super::types::{
    ChainEntry, ChainOutcome, ChainSlot, ChainsPhase, ChainsPublic, ChainsSecrets, ChainsSettings,
    ChainsView,
};
use crate::core::text::plain_word;
use crate::core::{
    CommonState, GameError, InvariantSet, InvariantViolation, PlayerId, Roster, Snapshot, Table,
    Timed, TurnEffect, Variant, Winner, seated_on_turn, transition, wrong_phase,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// The chains variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chains;

impl Chains {
    /// Creates a two-player chains table awaiting both players' words.
    #[instrument(skip(players), fields(players = players.len()))]
    pub fn create(
        players: Vec<PlayerId>,
        settings: ChainsSettings,
    ) -> Result<Table<Chains>, GameError> {
        let roster = Roster::with_bounds(players, 2, Some(2))?;
        let settings =
            ChainsSettings::with_turn_limit(*settings.chain_count(), *settings.turn_limit_ms());
        info!(chain_count = settings.chain_count(), "Chains game created");
        Ok(Table::fresh(
            ChainsPublic::new(roster, settings),
            ChainsSecrets::default(),
        ))
    }
}

fn opponent(public: &ChainsPublic, actor: &PlayerId) -> Result<PlayerId, GameError> {
    public
        .roster()
        .opponent_of(actor)
        .cloned()
        .ok_or_else(|| GameError::NotAPlayer {
            player: actor.clone(),
        })
}

fn slot_and_word<'a, 'b>(
    chain: &'a mut [ChainSlot],
    words: &'b [String],
    index: usize,
) -> Result<(&'a mut ChainSlot, &'b str), GameError> {
    match (chain.get_mut(index), words.get(index)) {
        (Some(slot), Some(word)) => Ok((slot, word.as_str())),
        _ => Err(GameError::invalid(format!("chain has no word {index}"))),
    }
}

// ─────────────────────────────────────────────────────────────
//  Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: a theme plus exactly `chain_count` plain words.
pub struct CompleteChain;

impl CompleteChain {
    /// Returns the uppercased words.
    pub fn check(setup: &ChainWords, chain_count: usize) -> Result<AcceptedWords, GameError> {
        let theme = plain_word(&setup.theme, "theme word")?.to_ascii_uppercase();
        if setup.words.len() != chain_count {
            return Err(GameError::invalid(format!(
                "exactly {chain_count} chain words are required, got {}",
                setup.words.len()
            )));
        }
        let words = setup
            .words
            .iter()
            .map(|w| plain_word(w, "chain word").map(str::to_ascii_uppercase))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AcceptedWords { theme, words })
    }
}

/// Precondition: the guess is not a word the guesser already revealed.
pub struct NotAlreadyRevealed;

impl NotAlreadyRevealed {
    /// Checks `guess` against the opponent's chain and secrets.
    pub fn check(
        slots: &[ChainSlot],
        words: &[String],
        guess: &str,
    ) -> Result<Option<usize>, GameError> {
        let matched = words
            .iter()
            .zip(slots)
            .position(|(w, s)| !s.is_revealed() && w == guess);
        if matched.is_none() && slots.iter().any(|s| s.word.as_deref() == Some(guess)) {
            return Err(GameError::duplicate(format!("{guess} is already revealed")));
        }
        Ok(matched)
    }
}

// ─────────────────────────────────────────────────────────────
//  Variant
// ─────────────────────────────────────────────────────────────

impl Variant for Chains {
    const NAME: &'static str = "chains";

    type Public = ChainsPublic;
    type Secrets = ChainsSecrets;
    type Setup = ChainWords;
    type AcceptedSetup = AcceptedWords;
    type Move = ChainGuess;
    type AcceptedMove = AcceptedChainGuess;
    type Report = ChainsReport;
    type View = ChainsView;

    fn check_setup(
        public: &ChainsPublic,
        _secrets: &ChainsSecrets,
        actor: &PlayerId,
        setup: &ChainWords,
    ) -> Result<AcceptedWords, GameError> {
        if public.phase() != &ChainsPhase::EnterWords {
            return Err(wrong_phase(public.phase(), "set_words"));
        }
        seated_on_turn(public, actor, false)?;
        let accepted = CompleteChain::check(setup, *public.chain_count())?;
        if public.has_words(actor) {
            return Err(GameError::duplicate("words already submitted"));
        }
        Ok(accepted)
    }

    fn resolve_setup(
        public: &mut ChainsPublic,
        secrets: &mut ChainsSecrets,
        actor: &PlayerId,
        accepted: AcceptedWords,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let slots = accepted
            .words
            .iter()
            .map(|w| ChainSlot::masked(w))
            .collect();
        public.set_words(actor, accepted.theme, slots);
        secrets.words.insert(actor.clone(), accepted.words);
        debug!(player = %actor, "Chain words recorded");

        if public.roster().iter().all(|p| public.has_words(p)) {
            transition(public.phase_mut(), ChainsPhase::Guessing)?;
            public.cursor_mut().reset();
            public.start_clock(now);
            info!("All chains submitted, guessing starts");
        }
        Ok(())
    }

    fn check_move(
        public: &ChainsPublic,
        secrets: &ChainsSecrets,
        actor: &PlayerId,
        action: &ChainGuess,
    ) -> Result<AcceptedChainGuess, GameError> {
        if public.phase() != &ChainsPhase::Guessing {
            return Err(wrong_phase(public.phase(), "guess"));
        }
        seated_on_turn(public, actor, true)?;
        let word = plain_word(&action.word, "guess")?.to_ascii_uppercase();
        let target = opponent(public, actor)?;
        let words = secrets
            .words
            .get(&target)
            .ok_or(GameError::SecretsMissing)?;
        let matched = NotAlreadyRevealed::check(public.chain_of(&target), words, &word)?;
        Ok(AcceptedChainGuess {
            word,
            target,
            matched,
        })
    }

    fn resolve_move(
        public: &mut ChainsPublic,
        secrets: &mut ChainsSecrets,
        actor: &PlayerId,
        accepted: AcceptedChainGuess,
        now: DateTime<Utc>,
    ) -> Result<ChainsReport, GameError> {
        let AcceptedChainGuess {
            word,
            target,
            matched,
        } = accepted;
        let words = secrets
            .words
            .get(&target)
            .ok_or(GameError::SecretsMissing)?;
        let chain = public
            .chain_mut(&target)
            .ok_or_else(|| GameError::invalid("opponent has no chain"))?;

        let mut hinted_index = None;
        match matched {
            Some(i) => {
                let (slot, word) = slot_and_word(chain, words, i)?;
                slot.reveal(word);
            }
            None => {
                hinted_index = chain.iter().position(|s| !s.is_revealed());
                if let Some(i) = hinted_index {
                    let (slot, word) = slot_and_word(chain, words, i)?;
                    slot.hint(word);
                }
            }
        }

        let entry = ChainEntry {
            guesser: actor.clone(),
            target: target.clone(),
            word: Some(word),
            outcome: if matched.is_some() {
                ChainOutcome::Correct
            } else {
                ChainOutcome::Miss
            },
        };
        public.record(entry.clone());

        let won = matched.is_some() && public.unrevealed_count(&target) == 0;
        if won {
            transition(
                public.phase_mut(),
                ChainsPhase::Ended {
                    winner: Winner::Player(actor.clone()),
                },
            )?;
            public.stop_clock();
        } else {
            let effect = if matched.is_some() {
                TurnEffect::Continue
            } else {
                TurnEffect::Pass
            };
            public.cursor_mut().apply(effect);
            public.start_clock(now);
        }
        debug!(outcome = %entry.outcome, won, "Chain guess resolved");

        Ok(ChainsReport {
            entry,
            word_index: matched,
            hinted_index,
            won,
        })
    }

    fn check_secrets(public: &ChainsPublic, secrets: &ChainsSecrets) -> Result<(), GameError> {
        for player in public.roster().iter() {
            let slots = public.chain_of(player);
            let words = secrets
                .words
                .get(player)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let fits = words.len() == slots.len()
                && words
                    .iter()
                    .zip(slots)
                    .all(|(w, s)| w.chars().count() == s.length && w.starts_with(&s.shown));
            if !fits || public.has_words(player) == words.is_empty() {
                return Err(GameError::invalid(format!(
                    "stored chain of {player} does not match the board"
                )));
            }
        }
        Ok(())
    }

    fn project(public: &ChainsPublic, secrets: &ChainsSecrets, viewer: &PlayerId) -> ChainsView {
        ChainsView {
            public: public.clone(),
            my_words: secrets.words.get(viewer).cloned(),
        }
    }

    fn check_invariants(state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        ChainsInvariants::check_all(state)
    }
}

impl Timed for Chains {
    fn deadline(public: &ChainsPublic) -> Option<DateTime<Utc>> {
        match public.phase() {
            ChainsPhase::Guessing => public.clock().as_ref().map(|c| c.deadline()),
            _ => None,
        }
    }

    fn check_timeout(public: &ChainsPublic, now: DateTime<Utc>) -> Result<(), GameError> {
        if public.phase() != &ChainsPhase::Guessing {
            return Err(wrong_phase(public.phase(), "expire_turn"));
        }
        match public.clock() {
            Some(clock) if clock.expired(now) => Ok(()),
            _ => Err(GameError::invalid("turn deadline has not passed")),
        }
    }

    fn resolve_timeout(
        public: &mut ChainsPublic,
        _secrets: &mut ChainsSecrets,
        now: DateTime<Utc>,
    ) -> Result<ChainsReport, GameError> {
        let guesser = public
            .current_player()
            .cloned()
            .ok_or_else(|| GameError::invalid("nobody is on turn"))?;
        let target = opponent(public, &guesser)?;
        let entry = ChainEntry {
            guesser,
            target,
            word: None,
            outcome: ChainOutcome::TimedOut,
        };
        public.record(entry.clone());
        public.cursor_mut().pass();
        public.start_clock(now);
        info!(player = %entry.guesser, "Turn timed out");

        Ok(ChainsReport {
            entry,
            word_index: None,
            hinted_index: None,
            won: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameErrorKind;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ann() -> PlayerId {
        PlayerId::from("ann")
    }

    fn ben() -> PlayerId {
        PlayerId::from("ben")
    }

    fn words(theme: &str, list: &[&str]) -> ChainWords {
        ChainWords {
            theme: theme.into(),
            words: list.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn ready_table() -> Table<Chains> {
        let mut table = Chains::create(vec![ann(), ben()], ChainsSettings::new(3)).unwrap();
        table
            .apply_setup(&ann(), words("sea", &["wave", "salt", "tide"]), t0())
            .unwrap();
        table
            .apply_setup(&ben(), words("forest", &["tree", "leaf", "moss"]), t0())
            .unwrap();
        table
    }

    fn guess(
        table: &mut Table<Chains>,
        who: &PlayerId,
        word: &str,
    ) -> Result<ChainsReport, GameError> {
        table.apply_move(who, ChainGuess { word: word.into() }, t0())
    }

    #[test]
    fn test_out_of_range_chain_count_falls_back() {
        assert_eq!(*ChainsSettings::new(2).chain_count(), 5);
        assert_eq!(*ChainsSettings::new(11).chain_count(), 5);
        assert_eq!(*ChainsSettings::new(10).chain_count(), 10);
    }

    #[test]
    fn test_setup_masks_words_and_publishes_theme() {
        let table = ready_table();
        let public = table.public();
        assert_eq!(
            public.theme_words().get(&ben()).map(String::as_str),
            Some("FOREST")
        );
        let slot = &public.chain_of(&ben())[0];
        assert_eq!(slot.first_letter, 'T');
        assert_eq!(slot.length, 4);
        assert_eq!(slot.revealed_letters, 1);
        assert_eq!(slot.shown, "T");
        assert!(slot.word.is_none());
        assert_eq!(table.deadline(), Some(t0() + TimeDelta::seconds(60)));
    }

    #[test]
    fn test_wrong_word_count_rejected() {
        let mut table = Chains::create(vec![ann(), ben()], ChainsSettings::new(3)).unwrap();
        let err = table
            .apply_setup(&ann(), words("sea", &["wave", "salt"]), t0())
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
        let err = table
            .apply_setup(&ann(), words("sea", &["wave", "salt", "t1de"]), t0())
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);
    }

    #[test]
    fn test_correct_guess_reveals_and_keeps_turn() {
        let mut table = ready_table();
        let report = guess(&mut table, &ann(), "Leaf").unwrap();
        assert_eq!(report.word_index, Some(1));
        assert_eq!(report.entry.outcome, ChainOutcome::Correct);
        assert_eq!(table.public().unrevealed_count(&ben()), 2);
        assert_eq!(
            table.public().chain_of(&ben())[1].word.as_deref(),
            Some("LEAF")
        );
        assert_eq!(table.public().current_player(), Some(&ann()));
    }

    #[test]
    fn test_revealed_word_is_duplicate() {
        let mut table = ready_table();
        guess(&mut table, &ann(), "leaf").unwrap();
        let err = guess(&mut table, &ann(), "LEAF").unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::Duplicate);
    }

    #[test]
    fn test_miss_hints_first_unrevealed_and_passes() {
        let mut table = ready_table();
        guess(&mut table, &ann(), "tree").unwrap();
        let report = guess(&mut table, &ann(), "rock").unwrap();
        assert_eq!(report.hinted_index, Some(1));
        let slot = &table.public().chain_of(&ben())[1];
        assert_eq!(slot.revealed_letters, 2);
        assert_eq!(slot.shown, "LE");
        assert_eq!(table.public().current_player(), Some(&ben()));
    }

    #[test]
    fn test_hint_is_capped_at_word_length() {
        let mut table = Chains::create(vec![ann(), ben()], ChainsSettings::new(3)).unwrap();
        table
            .apply_setup(&ann(), words("sea", &["ab", "cd", "ef"]), t0())
            .unwrap();
        table
            .apply_setup(&ben(), words("sky", &["gh", "ij", "kl"]), t0())
            .unwrap();
        for _ in 0..3 {
            guess(&mut table, &ann(), "zz").unwrap();
            guess(&mut table, &ben(), "zz").unwrap();
        }
        let slot = &table.public().chain_of(&ben())[0];
        assert_eq!(slot.revealed_letters, 2);
        assert!(slot.word.is_none());
    }

    #[test]
    fn test_revealing_last_word_wins() {
        let mut table = ready_table();
        for w in ["tree", "leaf"] {
            assert!(!guess(&mut table, &ann(), w).unwrap().won);
        }
        assert!(guess(&mut table, &ann(), "moss").unwrap().won);
        assert_eq!(table.winner(), Some(&Winner::Player(ann())));
        assert_eq!(table.deadline(), None);
    }

    #[test]
    fn test_expire_turn_requires_deadline() {
        let mut table = ready_table();
        let err = table
            .expire_turn(t0() + TimeDelta::seconds(10))
            .unwrap_err();
        assert_eq!(err.kind(), GameErrorKind::InvalidPayload);

        let later = t0() + TimeDelta::seconds(61);
        let report = table.expire_turn(later).unwrap();
        assert_eq!(report.entry.outcome, ChainOutcome::TimedOut);
        assert_eq!(report.entry.guesser, ann());
        assert_eq!(table.public().current_player(), Some(&ben()));
        assert_eq!(table.deadline(), Some(later + TimeDelta::seconds(60)));
        assert_eq!(table.public().chain_of(&ben())[0].revealed_letters, 1);
    }

    #[test]
    fn test_time_remaining_is_pure() {
        let table = ready_table();
        let at = t0() + TimeDelta::seconds(15);
        assert_eq!(
            table.public().time_remaining(at),
            Some(TimeDelta::seconds(45))
        );
        assert_eq!(
            table.public().time_remaining(at),
            Some(TimeDelta::seconds(45))
        );
    }

    #[test]
    fn test_view_shows_only_own_words() {
        let table = ready_table();
        let view = table.view_for(&ann());
        assert_eq!(view.my_words.as_ref().map(Vec::len), Some(3));
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("MOSS"));
        assert!(json.contains("TIDE"));
    }
}
