//! Motus: players share one sourced target word and take turns guessing it,
//! each attempt colored letter by letter.

mod action;
mod coloring;
mod contracts;
mod invariants;
mod types;

pub use action::{AcceptedWord, MotusReport, WordGuess};
pub use coloring::{LetterColor, LetterResult, color};
pub use contracts::{FitsTheBoard, Motus};
pub use invariants::{FinalWordOnlyWhenEnded, MotusInvariants, RowsFitTarget, WithinBudget};
pub use types::{
    AttemptRow, DEFAULT_MAX_ATTEMPTS, MotusPhase, MotusPublic, MotusSecrets, MotusSettings,
};
