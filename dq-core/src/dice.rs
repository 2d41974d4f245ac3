//! Dice notation and rolling.
//!
//! Supports the single-term notation used by moves and consequences: `XdY`,
//! e.g. `3d6`. Results always come back sorted highest first.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest number of dice a single roll may throw.
pub const MAX_DICE: u32 = 100;

/// Error type for dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice notation: {0:?} (expected something like 3d6)")]
    InvalidNotation(String),
    #[error("dice amount and size must both be at least 1 (got {0:?})")]
    NonPositive(String),
    #[error("cannot roll more than {MAX_DICE} dice at once (got {0})")]
    TooManyDice(u32),
}

/// A dice formula: `amount` dice with `faces` sides each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dice {
    pub amount: u32,
    pub faces: u32,
}

impl Dice {
    /// Parse `"<amount>d<faces>"`.
    ///
    /// Surrounding whitespace is ignored and the separator may be `d` or `D`.
    /// Both parts must be plain integers of at least 1.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        let parts: Vec<&str> = notation.split('d').collect();
        let [amount, faces] = parts.as_slice() else {
            return Err(DiceError::InvalidNotation(notation.clone()));
        };

        let amount: i64 = amount
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        let faces: i64 = faces
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;

        if amount < 1 || faces < 1 {
            return Err(DiceError::NonPositive(notation));
        }
        let faces = u32::try_from(faces).map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        let amount = u32::try_from(amount).map_err(|_| DiceError::TooManyDice(u32::MAX))?;
        if amount > MAX_DICE {
            return Err(DiceError::TooManyDice(amount));
        }

        Ok(Dice { amount, faces })
    }

    /// Roll with the given RNG.
    pub fn roll_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> RollResult {
        let mut rolls: Vec<u32> = (0..self.amount)
            .map(|_| rng.gen_range(1..=self.faces))
            .collect();
        rolls.sort_by(|a, b| b.cmp(a));

        RollResult { dice: *self, rolls }
    }
}

impl FromStr for Dice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dice::parse(s)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.amount, self.faces)
    }
}

/// The outcome of rolling a [`Dice`] formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub dice: Dice,
    /// Individual dice, highest first.
    pub rolls: Vec<u32>,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_total(&self.rolls))
    }
}

/// Render rolled values as a reply fragment.
///
/// Several dice render as `"<sum> = <r1> + <r2> + ..."`; a single die renders
/// as its bare value. The sum is taken in `u64` so any number of `u32` faces
/// adds up without wrapping.
pub fn format_total(rolls: &[u32]) -> String {
    match rolls {
        [single] => single.to_string(),
        _ => {
            let sum: u64 = rolls.iter().copied().map(u64::from).sum();
            let terms = rolls
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" + ");
            format!("{sum} = {terms}")
        }
    }
}
