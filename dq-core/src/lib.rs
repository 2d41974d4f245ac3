//! Engine for the dq dice-pool chat game.
//!
//! This crate provides:
//! - Dice notation parsing and rolling
//! - Characters with dice pools, moves and consequences
//! - The `dq ...` command grammar and its handlers
//! - A yes/no confirmation gate for destructive commands
//! - In-memory storage with JSON snapshots
//!
//! # Quick Start
//!
//! ```
//! use dq_core::{Engine, EngineConfig, MemoryStore, Message};
//!
//! let mut engine = Engine::new(MemoryStore::new(), EngineConfig::new());
//!
//! let reply = engine.handle(&Message::new("gm", "dq add char Ann")).unwrap();
//! assert_eq!(reply, "Added Ann (A).");
//!
//! // Ordinary chatter is ignored.
//! assert!(engine.handle(&Message::new("gm", "good evening")).is_none());
//! ```

pub mod config;
pub mod confirm;
pub mod dice;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ids;
pub mod lists;
pub mod model;
pub mod persist;
pub mod registry;
pub mod render;
pub mod store;
pub mod testing;

// Primary public API
pub use config::EngineConfig;
pub use confirm::ConfirmPolicy;
pub use dice::{Dice, DiceError, RollResult};
pub use engine::{Engine, Message};
pub use error::GameError;
pub use model::{Character, Consequence, Move, PlayerId, RecordId};
pub use persist::SavedGame;
pub use registry::CharacterRegistry;
pub use store::{EntityStore, MemoryStore, StoreError};
pub use testing::TestHarness;
