//! Error taxonomy for command handling.
//!
//! Every variant is recoverable at the dispatch boundary: the engine turns it
//! into a reply and carries on with the next message.

use crate::dice::DiceError;
use crate::ids::IdScope;
use crate::store::StoreError;
use thiserror::Error;

/// Errors raised while handling a single command.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid roll: {0}")]
    InvalidRoll(#[from] DiceError),

    #[error("Too many active {0}")]
    TooManyActive(IdScope),

    #[error("No {kind} matches {indicator:?}")]
    NotFound {
        kind: &'static str,
        indicator: String,
    },

    #[error("You don't have a character set. Use `dq set char [indicator]` to pick one.")]
    NoCharacterSet,

    #[error("Moves need a label, like `dq +m 2d6 Punch`")]
    MissingLabel,

    #[error("Characters need a name, like `dq add char Ann`")]
    MissingName,

    #[error("{label} has already been used")]
    AlreadyUsed { label: String },

    #[error("Not in the dice pool: {}", join_values(.missing))]
    ValuesNotInPool { missing: Vec<u32> },

    #[error("There are no consequences to roll")]
    EmptyConsequencePool,

    #[error("Don't know how to clear {0:?} (try cpools, dpools or pools)")]
    UnknownClearTarget(String),

    #[error("Not a number: {0:?}")]
    InvalidNumber(String),

    #[error("A raise uses one or two values, not {0}")]
    RaiseArity(usize),

    #[error("Another confirmation is still waiting for an answer")]
    ConfirmationPending,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl GameError {
    pub(crate) fn not_found(kind: &'static str, indicator: &str) -> Self {
        GameError::NotFound {
            kind,
            indicator: indicator.to_string(),
        }
    }

    /// Whether this error means something is broken rather than that the
    /// user's input was rejected.
    pub fn is_internal(&self) -> bool {
        matches!(self, GameError::Storage(_))
    }
}

fn join_values(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
