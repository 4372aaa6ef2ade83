//! Scripted games.
//!
//! A script names the settings, the players, and a list of timed steps. The
//! replay drives a [`GameRoom`] through the steps on a virtual clock and
//! records what every step produced, rejections included.

use crate::room::{Broadcast, GameRoom, RoomError, RoomServices};
use chrono::{DateTime, TimeDelta, Utc};
use parlor_rules::{GameErrorKind, Move, PlayerId, SetupPayload, Settings, SourcedWord};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Room id used for replays.
pub const REPLAY_ROOM: &str = "replay";

/// A scripted game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ReplayScript {
    /// Creation settings.
    settings: Settings,
    /// Seating order.
    players: Vec<PlayerId>,
    /// Word for variants that need one; fetched from the word source when
    /// absent.
    #[serde(default)]
    word: Option<String>,
    /// RNG seed for role assignment.
    #[serde(default)]
    seed: u64,
    /// Virtual time of the first step.
    #[serde(default = "default_start")]
    start: DateTime<Utc>,
    /// Steps in order.
    #[serde(default)]
    steps: Vec<ScriptStep>,
}

fn default_start() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// One scripted step. `after_ms` advances the virtual clock first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Secret submission.
    Setup {
        /// Submitting player.
        player: PlayerId,
        /// The secret.
        payload: SetupPayload,
        /// Delay before the step.
        #[serde(default)]
        after_ms: i64,
    },
    /// A move.
    Move {
        /// Acting player.
        player: PlayerId,
        /// The move.
        action: Move,
        /// Delay before the step.
        #[serde(default)]
        after_ms: i64,
    },
    /// Expire the current turn.
    Expire {
        /// Delay before the step.
        #[serde(default)]
        after_ms: i64,
    },
    /// Rebuild the room from its public state and the vault.
    Recover {
        /// Delay before the step.
        #[serde(default)]
        after_ms: i64,
    },
}

impl ScriptStep {
    fn after_ms(&self) -> i64 {
        match self {
            ScriptStep::Setup { after_ms, .. }
            | ScriptStep::Move { after_ms, .. }
            | ScriptStep::Expire { after_ms }
            | ScriptStep::Recover { after_ms } => *after_ms,
        }
    }
}

/// What one step produced. Step 0 is game creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step went through.
    Applied {
        /// Step number.
        step: usize,
        /// Resulting broadcast.
        broadcast: Broadcast,
    },
    /// The step was refused; the game is unchanged.
    Rejected {
        /// Step number.
        step: usize,
        /// Engine error kind, when the engine refused.
        kind: Option<GameErrorKind>,
        /// Human-readable reason.
        message: String,
    },
}

impl StepOutcome {
    fn of(step: usize, result: Result<Broadcast, RoomError>) -> Self {
        match result {
            Ok(broadcast) => StepOutcome::Applied { step, broadcast },
            Err(e) => {
                warn!(step, error = %e, "Step rejected");
                StepOutcome::Rejected {
                    step,
                    kind: e.game_kind(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// True if the step went through.
    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied { .. })
    }
}

/// Plays `script` against a fresh room built on `services`.
///
/// Replay stops early only when the game could not be created.
#[instrument(skip_all, fields(game = %script.settings.kind(), steps = script.steps.len()))]
pub async fn run_script(script: &ReplayScript, services: RoomServices) -> Vec<StepOutcome> {
    let mut room = GameRoom::with_seed(REPLAY_ROOM, services.clone(), script.seed);
    let mut now = script.start;

    let started = match &script.word {
        Some(word) => {
            room.start_with_word(
                script.players.clone(),
                script.settings,
                Some(SourcedWord::from_word(word.as_str())),
                now,
            )
            .await
        }
        None => room.start(script.players.clone(), script.settings, now).await,
    };
    let mut outcomes = vec![StepOutcome::of(0, started)];
    if !outcomes[0].is_applied() {
        return outcomes;
    }

    for (index, step) in script.steps.iter().enumerate() {
        now += TimeDelta::milliseconds(step.after_ms());
        let result = match step {
            ScriptStep::Setup {
                player, payload, ..
            } => room.apply_setup(player, payload.clone(), now).await,
            ScriptStep::Move { player, action, .. } => {
                room.apply_move(player, action.clone(), now).await
            }
            ScriptStep::Expire { .. } => room.expire_turn(now).await,
            ScriptStep::Recover { .. } => match room.snapshot().await {
                Some(public) => {
                    room = GameRoom::with_seed(REPLAY_ROOM, services.clone(), script.seed);
                    room.recover(public).await
                }
                None => Err(RoomError::NoGame {
                    room: REPLAY_ROOM.to_string(),
                }),
            },
        };
        outcomes.push(StepOutcome::of(index + 1, result));
    }

    let applied = outcomes.iter().filter(|o| o.is_applied()).count();
    info!(applied, rejected = outcomes.len() - applied, "Replay finished");
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::AcceptAll;
    use crate::vault::MemoryVault;
    use crate::words::{Language, StaticWords};
    use std::sync::Arc;

    fn services() -> RoomServices {
        RoomServices::new(
            Arc::new(StaticWords::with_seed(vec!["maison".to_string()], 1)),
            Arc::new(AcceptAll),
            Arc::new(MemoryVault::new()),
            Language::Fr,
        )
    }

    #[tokio::test]
    async fn test_hangman_script() {
        let script: ReplayScript = serde_json::from_value(serde_json::json!({
            "settings": {"game": "hangman"},
            "players": ["ann", "ben"],
            "steps": [
                {"step": "setup", "player": "ann", "payload": {"game": "hangman", "word": "chat"}},
                {"step": "move", "player": "ben", "action": {"game": "hangman", "letter": "a"}},
                {"step": "setup", "player": "ben", "payload": {"game": "hangman", "word": "loup"}},
                {"step": "move", "player": "ben", "action": {"game": "hangman", "letter": "a"}, "after_ms": 1000}
            ]
        }))
        .unwrap();

        let outcomes = run_script(&script, services()).await;
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes[0].is_applied());
        assert!(outcomes[1].is_applied());
        assert!(matches!(
            outcomes[2],
            StepOutcome::Rejected {
                step: 2,
                kind: Some(GameErrorKind::WrongPhase),
                ..
            }
        ));
        assert!(outcomes[3].is_applied());
        assert!(outcomes[4].is_applied());
    }

    #[tokio::test]
    async fn test_script_word_and_recover() {
        let script: ReplayScript = serde_json::from_value(serde_json::json!({
            "settings": {"game": "motus"},
            "players": ["ann", "ben"],
            "word": "jardin",
            "steps": [
                {"step": "recover"},
                {"step": "move", "player": "ann", "action": {"game": "motus", "word": "jardin"}}
            ]
        }))
        .unwrap();

        let outcomes = run_script(&script, services()).await;
        assert!(outcomes.iter().all(StepOutcome::is_applied));
        let StepOutcome::Applied { broadcast, .. } = &outcomes[2] else {
            panic!("applied guess expected");
        };
        let json = serde_json::to_string(&broadcast.public).unwrap();
        assert!(json.contains("JARDIN"), "the solved word is revealed");
    }

    #[tokio::test]
    async fn test_failed_creation_stops_replay() {
        let script: ReplayScript = serde_json::from_value(serde_json::json!({
            "settings": {"game": "mr_white"},
            "players": ["ann", "ben"],
            "word": "pomme",
            "steps": [{"step": "expire"}]
        }))
        .unwrap();
        let outcomes = run_script(&script, services()).await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0],
            StepOutcome::Rejected {
                kind: Some(GameErrorKind::InvalidRoster),
                ..
            }
        ));
    }
}
