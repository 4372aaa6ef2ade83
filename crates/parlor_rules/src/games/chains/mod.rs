//! Chains: each player hides a chain of words behind a public theme, and
//! players race to reveal the opponent's chain against a turn clock.

mod action;
mod contracts;
mod invariants;
mod types;

pub use action::{AcceptedChainGuess, AcceptedWords, ChainGuess, ChainWords, ChainsReport};
pub use contracts::{Chains, CompleteChain, NotAlreadyRevealed};
pub use invariants::{ChainsInvariants, MasksMatchWords, PrefixesConsistent, WinnerRevealedChain};
pub use types::{
    CHAIN_COUNTS, ChainEntry, ChainOutcome, ChainSlot, ChainsPhase, ChainsPublic, ChainsSecrets,
    ChainsSettings, ChainsView, DEFAULT_CHAIN_COUNT, TURN_LIMIT_MS,
};
