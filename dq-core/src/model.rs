//! Entity types: characters, moves, consequences and dice pools.

use crate::dice::Dice;
use crate::error::GameError;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque storage key for a character, move or consequence row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a chat participant, as supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shared character.
///
/// `char_id` is assigned once at creation and stays on the record; it is only
/// unique among active characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: RecordId,
    pub name: String,
    pub char_id: char,
    pub active: bool,
    pub player: Option<PlayerId>,
}

/// A labeled, reusable dice formula owned by one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub row: RecordId,
    pub character: RecordId,
    pub char_id: char,
    pub dice: Dice,
    pub label: String,
    #[serde(default)]
    pub used: bool,
}

/// A complication attached to a character; resolved in bulk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequence {
    pub row: RecordId,
    pub character: RecordId,
    pub char_id: char,
    pub dice: Dice,
    #[serde(default)]
    pub label: String,
}

/// Anything a user can select with an indicator.
pub trait Indicated {
    fn char_id(&self) -> char;
    fn name(&self) -> &str;
}

impl Indicated for Character {
    fn char_id(&self) -> char {
        self.char_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Indicated for Move {
    fn char_id(&self) -> char {
        self.char_id
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl Indicated for Consequence {
    fn char_id(&self) -> char {
        self.char_id
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Select one item by indicator.
///
/// A single-character indicator must equal an item's id exactly. Anything
/// longer is a case-insensitive prefix of the item's name; the first match in
/// slice order wins, so callers pass items sorted by id.
pub fn resolve_indicator<'a, T: Indicated>(
    items: &'a [T],
    indicator: &str,
    kind: &'static str,
) -> Result<&'a T, GameError> {
    let indicator = indicator.trim();
    let mut chars = indicator.chars();
    let found = match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(id), None) => items.iter().find(|item| item.char_id() == id),
        _ => {
            let prefix = indicator.to_lowercase();
            items
                .iter()
                .find(|item| item.name().to_lowercase().starts_with(&prefix))
        }
    };
    found.ok_or_else(|| GameError::not_found(kind, indicator))
}

/// A character's banked dice values, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DicePool(Vec<u32>);

impl DicePool {
    pub fn new(values: Vec<u32>) -> Self {
        Self(values)
    }

    /// Parse the stored comma-joined form.
    pub fn from_text(text: &str) -> Result<Self, StoreError> {
        let values = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| StoreError::CorruptPool(text.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(values))
    }

    /// The stored comma-joined form.
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, values: &[u32]) {
        self.0.extend_from_slice(values);
    }

    /// Remove one occurrence of each requested value.
    ///
    /// Nothing is removed unless every value is present.
    pub fn remove(&mut self, values: &[u32]) -> Result<(), GameError> {
        let mut remaining = self.0.clone();
        let mut missing = Vec::new();
        for value in values {
            match remaining.iter().position(|v| v == value) {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => missing.push(*value),
            }
        }
        if !missing.is_empty() {
            return Err(GameError::ValuesNotInPool { missing });
        }
        self.0 = remaining;
        Ok(())
    }

    /// Comma-joined values, or `empty`.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            "empty".to_string()
        } else {
            self.0
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}
