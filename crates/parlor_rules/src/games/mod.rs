//! The six variants. Each module owns its phases, payloads, validator,
//! resolver, projection and invariants.

pub mod chains;
pub mod digits;
pub mod hangman;
pub mod motus;
pub mod mr_white;
pub mod sea_battle;
