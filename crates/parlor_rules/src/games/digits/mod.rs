//! Digits: each player hides a code, players take turns guessing the
//! opponent's code and get correct-digit and correct-place counts back.

mod action;
mod contracts;
mod feedback;
mod invariants;
mod types;

pub use action::{AcceptedCode, AcceptedGuess, CodeGuess, DigitsReport, SecretCode};
pub use contracts::{Digits, WellFormedCode};
pub use feedback::{Feedback, score};
pub use invariants::{
    DigitsInvariants, RevealedOnlyWhenEnded, SecretFlagsMatch, WinnerCrackedCode,
};
pub use types::{
    CODE_LENGTHS, DEFAULT_CODE_LENGTH, DigitsPhase, DigitsPublic, DigitsSecrets, DigitsSettings,
    DigitsView, GuessEntry,
};
