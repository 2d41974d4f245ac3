//! Letter ids for characters, moves and consequences.
//!
//! Ids come from a 52 symbol alphabet, uppercase letters first. Each scope
//! (all active characters, or one character's moves, or one character's
//! consequences) hands out the smallest symbol not currently in use.

use crate::error::GameError;
use std::collections::BTreeSet;
use std::fmt;

/// Number of distinct ids available in one scope.
pub const ALPHABET_LEN: usize = 52;

/// The id alphabet, in allocation order.
pub fn alphabet() -> impl Iterator<Item = char> {
    ('A'..='Z').chain('a'..='z')
}

/// The set of ids an allocation is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdScope {
    Characters,
    Moves,
    Consequences,
}

impl IdScope {
    pub fn name(&self) -> &'static str {
        match self {
            IdScope::Characters => "characters",
            IdScope::Moves => "moves",
            IdScope::Consequences => "consequences",
        }
    }
}

impl fmt::Display for IdScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Smallest alphabet symbol not present in `used`.
pub fn next_free_id(
    scope: IdScope,
    used: impl IntoIterator<Item = char>,
) -> Result<char, GameError> {
    let used: BTreeSet<char> = used.into_iter().collect();
    alphabet()
        .find(|c| !used.contains(c))
        .ok_or(GameError::TooManyActive(scope))
}
