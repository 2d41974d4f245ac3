//! Testing utilities.
//!
//! - `TestHarness` for scripted conversations against a seeded engine
//! - `FailingStore` for exercising storage failures

use crate::config::EngineConfig;
use crate::engine::{Engine, Message};
use crate::model::{Character, Consequence, Move, PlayerId, RecordId};
use crate::store::{EntityStore, MemoryStore, StoreError};

/// Seed used by [`TestHarness::new`].
pub const TEST_SEED: u64 = 0xD1CE;

/// Drives an engine with `(sender, text)` messages.
pub struct TestHarness<S = MemoryStore> {
    pub engine: Engine<S>,
}

impl TestHarness<MemoryStore> {
    /// A harness over an empty in-memory store with seeded dice.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for TestHarness<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EntityStore> TestHarness<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            engine: Engine::new(store, EngineConfig::new().with_seed(TEST_SEED)),
        }
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(store, config),
        }
    }

    /// Send one message; `None` if the engine ignored it.
    pub fn send(&mut self, sender: &str, text: &str) -> Option<String> {
        self.engine.handle(&Message::new(sender, text))
    }

    /// Send one message that must produce a reply.
    pub fn reply(&mut self, sender: &str, text: &str) -> String {
        self.send(sender, text)
            .unwrap_or_else(|| panic!("{sender} sent {text:?} and got no reply"))
    }

    /// Send every message in order and collect the replies.
    pub fn run_script(&mut self, script: &[(&str, &str)]) -> Vec<Option<String>> {
        script
            .iter()
            .map(|(sender, text)| self.send(sender, text))
            .collect()
    }

    /// Active characters, by id.
    pub fn characters(&self) -> Vec<Character> {
        self.engine
            .registry()
            .list_active()
            .unwrap_or_else(|e| panic!("listing characters failed: {e}"))
    }

    /// The character `player` is currently bound to, if any.
    pub fn character_of(&self, player: &str) -> Option<Character> {
        self.engine
            .registry()
            .player_character(&PlayerId::new(player))
            .ok()
    }
}

/// Assert that a reply reports a rejected input.
pub fn assert_rejected(reply: &str) {
    assert!(reply.starts_with("[ERROR] "), "expected a rejection, got {reply:?}");
}

/// An in-memory store whose writes can be switched off.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: bool,
    failing_pools: bool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Make only dice pool writes fail (or succeed again).
    pub fn set_failing_pools(&mut self, failing: bool) {
        self.failing_pools = failing;
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        } else {
            Ok(())
        }
    }
}

impl EntityStore for FailingStore {
    fn create_character(&mut self, name: &str, char_id: char) -> Result<RecordId, StoreError> {
        self.check()?;
        self.inner.create_character(name, char_id)
    }

    fn active_characters(&self) -> Result<Vec<Character>, StoreError> {
        self.inner.active_characters()
    }

    fn character(&self, id: RecordId) -> Result<Character, StoreError> {
        self.inner.character(id)
    }

    fn set_active(&mut self, id: RecordId, active: bool) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_active(id, active)
    }

    fn set_name(&mut self, id: RecordId, name: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_name(id, name)
    }

    fn set_player(&mut self, id: RecordId, player: Option<PlayerId>) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_player(id, player)
    }

    fn pool(&self, id: RecordId) -> Result<String, StoreError> {
        self.inner.pool(id)
    }

    fn set_pool(&mut self, id: RecordId, pool: &str) -> Result<(), StoreError> {
        self.check()?;
        if self.failing_pools {
            return Err(StoreError::Unavailable("pool table locked".to_string()));
        }
        self.inner.set_pool(id, pool)
    }

    fn insert_move(&mut self, mv: Move) -> Result<(), StoreError> {
        self.check()?;
        self.inner.insert_move(mv)
    }

    fn moves_for(&self, character: RecordId) -> Result<Vec<Move>, StoreError> {
        self.inner.moves_for(character)
    }

    fn set_move_used(&mut self, row: RecordId, used: bool) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_move_used(row, used)
    }

    fn delete_move(&mut self, row: RecordId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete_move(row)
    }

    fn insert_consequence(&mut self, consequence: Consequence) -> Result<(), StoreError> {
        self.check()?;
        self.inner.insert_consequence(consequence)
    }

    fn consequences_for(&self, character: RecordId) -> Result<Vec<Consequence>, StoreError> {
        self.inner.consequences_for(character)
    }

    fn delete_consequences_for(&mut self, character: RecordId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete_consequences_for(character)
    }

    fn delete_consequence(&mut self, row: RecordId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete_consequence(row)
    }
}
