//! Contract-based validation and atomic resolution.
//!
//! Every variant splits a move into a pure precondition (`check_*`, the move
//! validator) and a resolver (`resolve_*`) that only ever sees accepted
//! moves. [`Table`] runs the resolver on scratch copies, checks the
//! postconditions, and commits only when everything held: {P} move {Q}.

use super::error::GameError;
use super::ids::PlayerId;
use super::invariants::{self, InvariantSet, InvariantViolation, SharedInvariants};
use super::phase::{Lifecycle, Stage, Winner};
use super::state::CommonState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, info, instrument, warn};

/// Uninhabited setup payload for variants without a setup phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoSetup {}

/// Read-only view of a state under check.
#[derive(Debug)]
pub struct Snapshot<'a, V: Variant> {
    /// Public half.
    pub public: &'a V::Public,
    /// Secret half.
    pub secrets: &'a V::Secrets,
}

/// One game variant: validator, resolver, and projector over its own types.
pub trait Variant: Sized {
    /// Variant name used in logs.
    const NAME: &'static str;

    /// Broadcast-safe state.
    type Public: CommonState + Clone + Debug + PartialEq;
    /// Server-only secrets, keyed by player inside.
    type Secrets: Clone + Debug + Default;
    /// Secret submission payload.
    type Setup: Debug;
    /// Setup payload after validation.
    type AcceptedSetup;
    /// Move payload.
    type Move: Debug;
    /// Move payload after validation.
    type AcceptedMove;
    /// Structured result of a resolved move.
    type Report: Clone + Debug;
    /// Per-player projection.
    type View: Clone + Debug;

    /// Setup precondition. Never mutates.
    fn check_setup(
        public: &Self::Public,
        secrets: &Self::Secrets,
        actor: &PlayerId,
        setup: &Self::Setup,
    ) -> Result<Self::AcceptedSetup, GameError>;

    /// Records an accepted setup; starts play once everyone has submitted.
    fn resolve_setup(
        public: &mut Self::Public,
        secrets: &mut Self::Secrets,
        actor: &PlayerId,
        accepted: Self::AcceptedSetup,
        now: DateTime<Utc>,
    ) -> Result<(), GameError>;

    /// Move precondition. Never mutates.
    fn check_move(
        public: &Self::Public,
        secrets: &Self::Secrets,
        actor: &PlayerId,
        action: &Self::Move,
    ) -> Result<Self::AcceptedMove, GameError>;

    /// Resolves an accepted move.
    fn resolve_move(
        public: &mut Self::Public,
        secrets: &mut Self::Secrets,
        actor: &PlayerId,
        accepted: Self::AcceptedMove,
        now: DateTime<Utc>,
    ) -> Result<Self::Report, GameError>;

    /// Projection for one viewer.
    fn project(public: &Self::Public, secrets: &Self::Secrets, viewer: &PlayerId) -> Self::View;

    /// Precondition for re-attaching secrets from a vault: they must fit the
    /// public state they are joined to.
    fn check_secrets(_public: &Self::Public, _secrets: &Self::Secrets) -> Result<(), GameError> {
        Ok(())
    }

    /// Variant-specific state invariants.
    fn check_invariants(_state: &Snapshot<'_, Self>) -> Result<(), Vec<InvariantViolation>> {
        Ok(())
    }
}

/// A variant whose turns carry a wall-clock deadline.
pub trait Timed: Variant {
    /// Deadline of the current turn, if one is running.
    fn deadline(public: &Self::Public) -> Option<DateTime<Utc>>;

    /// Precondition for forcing a pass: the deadline must have passed.
    fn check_timeout(public: &Self::Public, now: DateTime<Utc>) -> Result<(), GameError>;

    /// Passes the turn of a player who ran out of time.
    fn resolve_timeout(
        public: &mut Self::Public,
        secrets: &mut Self::Secrets,
        now: DateTime<Utc>,
    ) -> Result<Self::Report, GameError>;
}

/// Result of an accepted setup submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupOutcome {
    /// Who submitted.
    pub player: PlayerId,
    /// True if this submission completed the barrier and play started.
    pub play_started: bool,
}

// ─────────────────────────────────────────────────────────────
//  Table
// ─────────────────────────────────────────────────────────────

/// A live game of one variant: public state plus the secret store.
///
/// Secrets are absent after [`Table::restore`] until
/// [`Table::inject_secrets`]; every mutation fails with
/// [`GameError::SecretsMissing`] in the meantime.
#[derive(Debug, Clone)]
pub struct Table<V: Variant> {
    public: V::Public,
    secrets: Option<V::Secrets>,
}

impl<V: Variant> Table<V> {
    /// Wraps a freshly created public state with empty or initial secrets.
    pub(crate) fn fresh(public: V::Public, secrets: V::Secrets) -> Self {
        Self {
            public,
            secrets: Some(secrets),
        }
    }

    /// Rebuilds a table from persisted public state, without secrets.
    #[instrument(skip(public), fields(game = V::NAME))]
    pub fn restore(public: V::Public) -> Self {
        debug!("Restoring table without secrets");
        Self {
            public,
            secrets: None,
        }
    }

    /// Re-attaches secrets held by the caller. Secrets that disagree with
    /// the public state are refused and the table keeps what it had.
    #[instrument(skip(self, secrets), fields(game = V::NAME))]
    pub fn inject_secrets(&mut self, secrets: V::Secrets) -> Result<(), GameError> {
        V::check_secrets(&self.public, &secrets).inspect_err(|e| {
            warn!(error = %e, "Injected secrets refused");
        })?;
        debug!("Secrets re-injected");
        self.secrets = Some(secrets);
        Ok(())
    }

    /// Broadcast-safe state.
    pub fn public(&self) -> &V::Public {
        &self.public
    }

    /// Secrets, for the caller's side channel only.
    pub fn secrets(&self) -> Option<&V::Secrets> {
        self.secrets.as_ref()
    }

    /// True once the game has ended.
    pub fn is_over(&self) -> bool {
        self.public.stage() == Stage::Ended
    }

    /// The winner, once ended.
    pub fn winner(&self) -> Option<&Winner> {
        self.public.winner()
    }

    /// Projection for one viewer. Without secrets, only public data shows.
    pub fn view_for(&self, viewer: &PlayerId) -> V::View {
        match &self.secrets {
            Some(secrets) => V::project(&self.public, secrets, viewer),
            None => V::project(&self.public, &V::Secrets::default(), viewer),
        }
    }

    /// Validates and records a secret submission.
    #[instrument(skip(self, actor, setup, now), fields(game = V::NAME, player = %actor))]
    pub fn apply_setup(
        &mut self,
        actor: &PlayerId,
        setup: V::Setup,
        now: DateTime<Utc>,
    ) -> Result<SetupOutcome, GameError> {
        self.commit(actor, |public, secrets| {
            let accepted = V::check_setup(public, secrets, actor, &setup)?;
            V::resolve_setup(public, secrets, actor, accepted, now)?;
            Ok(SetupOutcome {
                player: actor.clone(),
                play_started: public.stage() == Stage::Play,
            })
        })
    }

    /// Validates and resolves a move.
    #[instrument(skip(self, actor, now), fields(game = V::NAME, player = %actor))]
    pub fn apply_move(
        &mut self,
        actor: &PlayerId,
        action: V::Move,
        now: DateTime<Utc>,
    ) -> Result<V::Report, GameError> {
        self.commit(actor, |public, secrets| {
            let accepted = V::check_move(public, secrets, actor, &action)?;
            V::resolve_move(public, secrets, actor, accepted, now)
        })
    }

    /// Validate-then-resolve on scratch copies; commit only on success.
    fn commit<R>(
        &mut self,
        actor: &PlayerId,
        step: impl FnOnce(&mut V::Public, &mut V::Secrets) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        let secrets = match &self.secrets {
            Some(secrets) => secrets,
            None if self.is_over() => return Err(GameError::AlreadyOver),
            None => {
                warn!(player = %actor, "Move refused: secrets not restored");
                return Err(GameError::SecretsMissing);
            }
        };

        let mut public = self.public.clone();
        let mut scratch = secrets.clone();
        let result = step(&mut public, &mut scratch).inspect_err(|e| {
            warn!(player = %actor, error = %e, kind = %e.kind(), "Move rejected");
        })?;

        #[cfg(debug_assertions)]
        Self::post(&self.public, &public, &scratch)?;

        let before = self.public.phase().label();
        let after = public.phase().label();
        if before != after {
            info!(game = V::NAME, from = before, to = after, "Phase changed");
        }
        if let Some(winner) = public.winner() {
            if !self.is_over() {
                info!(game = V::NAME, %winner, "Game ended");
            }
        }

        self.public = public;
        self.secrets = Some(scratch);
        Ok(result)
    }

    /// Postcondition: shared and variant invariants hold after the step.
    #[cfg_attr(not(debug_assertions), allow(dead_code))]
    fn post(before: &V::Public, after: &V::Public, secrets: &V::Secrets) -> Result<(), GameError> {
        let mut violations = Vec::new();
        if let Err(v) = SharedInvariants::check_all(after) {
            violations.extend(v);
        }
        if let Err(v) = invariants::check_step(before, after) {
            violations.extend(v);
        }
        if let Err(v) = V::check_invariants(&Snapshot {
            public: after,
            secrets,
        }) {
            violations.extend(v);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvariantViolation {
                description: format!(
                    "Postcondition failed: {}",
                    invariants::describe(&violations)
                ),
            })
        }
    }
}

impl<V: Timed> Table<V> {
    /// Deadline of the running turn.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        V::deadline(&self.public)
    }

    /// Forces a pass once the current turn's deadline has passed.
    #[instrument(skip(self), fields(game = V::NAME))]
    pub fn expire_turn(&mut self, now: DateTime<Utc>) -> Result<V::Report, GameError> {
        let actor = self
            .public
            .current_player()
            .cloned()
            .unwrap_or_else(|| PlayerId::new("<clock>"));
        self.commit(&actor, |public, secrets| {
            V::check_timeout(public, now)?;
            V::resolve_timeout(public, secrets, now)
        })
    }
}
