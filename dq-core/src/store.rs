//! Persistence interface for characters, moves and consequences.
//!
//! The engine only needs simple get/set/insert/delete operations against
//! three tables. [`MemoryStore`] keeps them in memory and can be snapshotted
//! to disk with [`crate::persist::SavedGame`].

use crate::model::{Character, Consequence, Move, PlayerId, RecordId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the persistence layer.
///
/// The engine does not interpret these; they are surfaced to users verbatim.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record with id {0}")]
    MissingRecord(RecordId),

    #[error("stored dice pool is corrupt: {0:?}")]
    CorruptPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Operations the engine performs against its backing tables.
///
/// Calls are synchronous and are never made concurrently.
pub trait EntityStore {
    /// Insert a new active character and return its key.
    fn create_character(&mut self, name: &str, char_id: char) -> Result<RecordId, StoreError>;
    /// Every active character, in no particular order.
    fn active_characters(&self) -> Result<Vec<Character>, StoreError>;
    fn character(&self, id: RecordId) -> Result<Character, StoreError>;
    fn set_active(&mut self, id: RecordId, active: bool) -> Result<(), StoreError>;
    fn set_name(&mut self, id: RecordId, name: &str) -> Result<(), StoreError>;
    fn set_player(&mut self, id: RecordId, player: Option<PlayerId>) -> Result<(), StoreError>;
    /// The character's dice pool in its stored comma-joined form.
    fn pool(&self, id: RecordId) -> Result<String, StoreError>;
    fn set_pool(&mut self, id: RecordId, pool: &str) -> Result<(), StoreError>;

    fn insert_move(&mut self, mv: Move) -> Result<(), StoreError>;
    fn moves_for(&self, character: RecordId) -> Result<Vec<Move>, StoreError>;
    fn set_move_used(&mut self, row: RecordId, used: bool) -> Result<(), StoreError>;
    fn delete_move(&mut self, row: RecordId) -> Result<(), StoreError>;

    fn insert_consequence(&mut self, consequence: Consequence) -> Result<(), StoreError>;
    fn consequences_for(&self, character: RecordId) -> Result<Vec<Consequence>, StoreError>;
    fn delete_consequences_for(&mut self, character: RecordId) -> Result<(), StoreError>;
    fn delete_consequence(&mut self, row: RecordId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CharacterRow {
    character: Character,
    #[serde(default)]
    pool: String,
}

/// In-memory tables, serializable as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    characters: Vec<CharacterRow>,
    moves: Vec<Move>,
    consequences: Vec<Consequence>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, id: RecordId) -> Result<&CharacterRow, StoreError> {
        self.characters
            .iter()
            .find(|row| row.character.id == id)
            .ok_or(StoreError::MissingRecord(id))
    }

    fn row_mut(&mut self, id: RecordId) -> Result<&mut CharacterRow, StoreError> {
        self.characters
            .iter_mut()
            .find(|row| row.character.id == id)
            .ok_or(StoreError::MissingRecord(id))
    }
}

impl EntityStore for MemoryStore {
    fn create_character(&mut self, name: &str, char_id: char) -> Result<RecordId, StoreError> {
        let id = RecordId::new();
        self.characters.push(CharacterRow {
            character: Character {
                id,
                name: name.to_string(),
                char_id,
                active: true,
                player: None,
            },
            pool: String::new(),
        });
        Ok(id)
    }

    fn active_characters(&self) -> Result<Vec<Character>, StoreError> {
        Ok(self
            .characters
            .iter()
            .filter(|row| row.character.active)
            .map(|row| row.character.clone())
            .collect())
    }

    fn character(&self, id: RecordId) -> Result<Character, StoreError> {
        Ok(self.row(id)?.character.clone())
    }

    fn set_active(&mut self, id: RecordId, active: bool) -> Result<(), StoreError> {
        self.row_mut(id)?.character.active = active;
        Ok(())
    }

    fn set_name(&mut self, id: RecordId, name: &str) -> Result<(), StoreError> {
        self.row_mut(id)?.character.name = name.to_string();
        Ok(())
    }

    fn set_player(&mut self, id: RecordId, player: Option<PlayerId>) -> Result<(), StoreError> {
        self.row_mut(id)?.character.player = player;
        Ok(())
    }

    fn pool(&self, id: RecordId) -> Result<String, StoreError> {
        Ok(self.row(id)?.pool.clone())
    }

    fn set_pool(&mut self, id: RecordId, pool: &str) -> Result<(), StoreError> {
        self.row_mut(id)?.pool = pool.to_string();
        Ok(())
    }

    fn insert_move(&mut self, mv: Move) -> Result<(), StoreError> {
        self.row(mv.character)?;
        self.moves.push(mv);
        Ok(())
    }

    fn moves_for(&self, character: RecordId) -> Result<Vec<Move>, StoreError> {
        Ok(self
            .moves
            .iter()
            .filter(|mv| mv.character == character)
            .cloned()
            .collect())
    }

    fn set_move_used(&mut self, row: RecordId, used: bool) -> Result<(), StoreError> {
        let mv = self
            .moves
            .iter_mut()
            .find(|mv| mv.row == row)
            .ok_or(StoreError::MissingRecord(row))?;
        mv.used = used;
        Ok(())
    }

    fn delete_move(&mut self, row: RecordId) -> Result<(), StoreError> {
        let before = self.moves.len();
        self.moves.retain(|mv| mv.row != row);
        if self.moves.len() == before {
            return Err(StoreError::MissingRecord(row));
        }
        Ok(())
    }

    fn insert_consequence(&mut self, consequence: Consequence) -> Result<(), StoreError> {
        self.row(consequence.character)?;
        self.consequences.push(consequence);
        Ok(())
    }

    fn consequences_for(&self, character: RecordId) -> Result<Vec<Consequence>, StoreError> {
        Ok(self
            .consequences
            .iter()
            .filter(|c| c.character == character)
            .cloned()
            .collect())
    }

    fn delete_consequences_for(&mut self, character: RecordId) -> Result<(), StoreError> {
        self.consequences.retain(|c| c.character != character);
        Ok(())
    }

    fn delete_consequence(&mut self, row: RecordId) -> Result<(), StoreError> {
        let before = self.consequences.len();
        self.consequences.retain(|c| c.row != row);
        if self.consequences.len() == before {
            return Err(StoreError::MissingRecord(row));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Dice;

    #[test]
    fn test_character_lifecycle() {
        let mut store = MemoryStore::new();
        let id = store.create_character("Ann", 'A').unwrap();
        assert_eq!(store.active_characters().unwrap().len(), 1);

        store.set_pool(id, "6,3").unwrap();
        assert_eq!(store.pool(id).unwrap(), "6,3");

        store.set_active(id, false).unwrap();
        assert!(store.active_characters().unwrap().is_empty());
        assert_eq!(store.character(id).unwrap().name, "Ann");
    }

    #[test]
    fn test_missing_records() {
        let mut store = MemoryStore::new();
        let ghost = RecordId::new();
        assert!(matches!(store.character(ghost), Err(StoreError::MissingRecord(_))));
        assert!(store.delete_move(ghost).is_err());
        let orphan = Move {
            row: RecordId::new(),
            character: ghost,
            char_id: 'A',
            dice: Dice { amount: 1, faces: 6 },
            label: "Punch".into(),
            used: false,
        };
        assert!(store.insert_move(orphan).is_err());
    }

    #[test]
    fn test_consequences_scoped_to_character() {
        let mut store = MemoryStore::new();
        let ann = store.create_character("Ann", 'A').unwrap();
        let bob = store.create_character("Bob", 'B').unwrap();
        for owner in [ann, bob] {
            store
                .insert_consequence(Consequence {
                    row: RecordId::new(),
                    character: owner,
                    char_id: 'A',
                    dice: Dice { amount: 1, faces: 6 },
                    label: String::new(),
                })
                .unwrap();
        }
        store.delete_consequences_for(ann).unwrap();
        assert!(store.consequences_for(ann).unwrap().is_empty());
        assert_eq!(store.consequences_for(bob).unwrap().len(), 1);
    }
}
