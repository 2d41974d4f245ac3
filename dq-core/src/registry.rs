//! Character lifecycle and lookup.

use crate::error::GameError;
use crate::ids::{next_free_id, IdScope};
use crate::lists::Sheet;
use crate::model::{resolve_indicator, Character, PlayerId};
use crate::store::EntityStore;
use tracing::info;

/// Owns the entity store and answers every question about characters.
pub struct CharacterRegistry<S> {
    store: S,
}

impl<S: EntityStore> CharacterRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Active characters ordered by id, uppercase before lowercase.
    pub fn list_active(&self) -> Result<Vec<Character>, GameError> {
        let mut characters = self.store.active_characters()?;
        characters.sort_by_key(|c| c.char_id);
        Ok(characters)
    }

    /// The next id a new character would get.
    pub fn next_free_id(&self) -> Result<char, GameError> {
        let active = self.store.active_characters()?;
        next_free_id(IdScope::Characters, active.iter().map(|c| c.char_id))
    }

    /// Create a new active character under the smallest free id.
    pub fn create(&mut self, name: &str) -> Result<Character, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::MissingName);
        }
        let char_id = self.next_free_id()?;
        let id = self.store.create_character(name, char_id)?;
        info!(%id, %char_id, name, "character created");
        Ok(self.store.character(id)?)
    }

    /// Soft-delete a character. Its id becomes free straight away and any
    /// player bound to it is released.
    pub fn archive(&mut self, character: &Character) -> Result<(), GameError> {
        self.store.set_active(character.id, false)?;
        if character.player.is_some() {
            self.store.set_player(character.id, None)?;
        }
        info!(id = %character.id, char_id = %character.char_id, name = %character.name, "character archived");
        Ok(())
    }

    /// Archive every active character.
    pub fn archive_all(&mut self) -> Result<usize, GameError> {
        let active = self.list_active()?;
        for character in &active {
            self.archive(character)?;
        }
        Ok(active.len())
    }

    pub fn rename(&mut self, character: &Character, name: &str) -> Result<Character, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::MissingName);
        }
        self.store.set_name(character.id, name)?;
        Ok(self.store.character(character.id)?)
    }

    /// Find an active character by id letter or name prefix.
    pub fn resolve_by_indicator(&self, indicator: &str) -> Result<Character, GameError> {
        let active = self.list_active()?;
        resolve_indicator(&active, indicator, "character").cloned()
    }

    /// The active character bound to `player`.
    pub fn player_character(&self, player: &PlayerId) -> Result<Character, GameError> {
        self.list_active()?
            .into_iter()
            .find(|c| c.player.as_ref() == Some(player))
            .ok_or(GameError::NoCharacterSet)
    }

    /// Bind `player` to `character`, releasing whatever they played before.
    pub fn bind_player(&mut self, character: &Character, player: &PlayerId) -> Result<Character, GameError> {
        for previous in self.list_active()? {
            if previous.id != character.id && previous.player.as_ref() == Some(player) {
                self.store.set_player(previous.id, None)?;
            }
        }
        self.store.set_player(character.id, Some(player.clone()))?;
        info!(%player, char_id = %character.char_id, "player bound");
        Ok(self.store.character(character.id)?)
    }

    /// Pool, move and consequence operations for one character.
    pub fn sheet(&mut self, character: &Character) -> Sheet<'_, S> {
        Sheet::new(&mut self.store, character.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ALPHABET_LEN;
    use crate::store::MemoryStore;

    fn registry() -> CharacterRegistry<MemoryStore> {
        CharacterRegistry::new(MemoryStore::new())
    }

    #[test]
    fn test_ids_ascend() {
        let mut reg = registry();
        let ids: Vec<char> = (0..ALPHABET_LEN)
            .map(|i| reg.create(&format!("Char {i}")).unwrap().char_id)
            .collect();
        let expected: Vec<char> = crate::ids::alphabet().collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_too_many_active() {
        let mut reg = registry();
        for i in 0..ALPHABET_LEN {
            reg.create(&format!("Char {i}")).unwrap();
        }
        let err = reg.create("One Too Many").unwrap_err();
        assert!(matches!(err, GameError::TooManyActive(IdScope::Characters)));
    }

    #[test]
    fn test_archived_id_is_reused_first() {
        let mut reg = registry();
        let _ann = reg.create("Ann").unwrap();
        let bob = reg.create("Bob").unwrap();
        let _cat = reg.create("Cat").unwrap();

        reg.archive(&bob).unwrap();
        let dan = reg.create("Dan").unwrap();
        assert_eq!(dan.char_id, 'B');
        assert_eq!(reg.create("Eve").unwrap().char_id, 'D');
    }

    #[test]
    fn test_list_active_sorted() {
        let mut reg = registry();
        let ann = reg.create("Ann").unwrap();
        reg.create("Bob").unwrap();
        reg.archive(&ann).unwrap();
        reg.create("Cat").unwrap();

        let names: Vec<String> = reg.list_active().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Cat", "Bob"]);
    }

    #[test]
    fn test_resolve_by_indicator() {
        let mut reg = registry();
        reg.create("Ann").unwrap();
        reg.create("Bob").unwrap();

        assert_eq!(reg.resolve_by_indicator("A").unwrap().name, "Ann");
        assert_eq!(reg.resolve_by_indicator("bo").unwrap().name, "Bob");
        assert!(matches!(
            reg.resolve_by_indicator("z"),
            Err(GameError::NotFound { kind: "character", .. })
        ));
    }

    #[test]
    fn test_archived_characters_do_not_resolve() {
        let mut reg = registry();
        let ann = reg.create("Ann").unwrap();
        reg.archive(&ann).unwrap();
        assert!(reg.resolve_by_indicator("ann").is_err());
        assert!(reg.resolve_by_indicator("A").is_err());
    }

    #[test]
    fn test_rebinding_player() {
        let mut reg = registry();
        let a = reg.create("Ann").unwrap();
        let b = reg.create("Bob").unwrap();
        let player = PlayerId::new("p");

        reg.bind_player(&a, &player).unwrap();
        assert_eq!(reg.player_character(&player).unwrap().id, a.id);

        reg.bind_player(&b, &player).unwrap();
        assert_eq!(reg.player_character(&player).unwrap().id, b.id);
        assert_eq!(reg.resolve_by_indicator("A").unwrap().player, None);
    }

    #[test]
    fn test_no_character_set() {
        let mut reg = registry();
        let ann = reg.create("Ann").unwrap();
        let player = PlayerId::new("p");
        assert!(matches!(reg.player_character(&player), Err(GameError::NoCharacterSet)));

        reg.bind_player(&ann, &player).unwrap();
        let ann = reg.player_character(&player).unwrap();
        reg.archive(&ann).unwrap();
        assert!(matches!(reg.player_character(&player), Err(GameError::NoCharacterSet)));
    }

    #[test]
    fn test_create_requires_name() {
        let mut reg = registry();
        assert!(matches!(reg.create("   "), Err(GameError::MissingName)));
    }

    #[test]
    fn test_rename() {
        let mut reg = registry();
        let ann = reg.create("Ann").unwrap();
        let renamed = reg.rename(&ann, "Annabel").unwrap();
        assert_eq!(renamed.name, "Annabel");
        assert_eq!(renamed.char_id, 'A');
    }
}
