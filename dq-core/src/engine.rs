//! Command handling: one inbound chat message in, at most one reply out.
//!
//! The engine takes `&mut self` for every message, so each message is handled
//! to completion before the next one starts. A transport that receives
//! messages concurrently must share the engine behind a single lock.

use crate::config::EngineConfig;
use crate::confirm::{Confirmation, PendingAction, Resolution};
use crate::dice::{format_total, Dice};
use crate::dispatch::{
    looks_like_values, parse_clear, parse_command, parse_names, parse_values, parse_view,
    ClearTarget, Command, ViewRequest, ViewTarget,
};
use crate::error::GameError;
use crate::model::{Character, PlayerId};
use crate::registry::CharacterRegistry;
use crate::render::{block, character_line, EMPTY};
use crate::store::{EntityStore, MemoryStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: PlayerId,
    pub text: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: PlayerId::new(sender),
            text: text.into(),
        }
    }
}

/// The game engine.
pub struct Engine<S = MemoryStore> {
    registry: CharacterRegistry<S>,
    confirmation: Confirmation,
    rng: StdRng,
    config: EngineConfig,
}

impl<S: EntityStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            registry: CharacterRegistry::new(store),
            confirmation: Confirmation::default(),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &CharacterRegistry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CharacterRegistry<S> {
        &mut self.registry
    }

    pub fn store(&self) -> &S {
        self.registry.store()
    }

    pub fn into_store(self) -> S {
        self.registry.into_store()
    }

    pub fn confirmation_pending(&self) -> bool {
        self.confirmation.is_pending()
    }

    /// Handle one message. Returns `None` when the message was not meant for
    /// the engine.
    pub fn handle(&mut self, message: &Message) -> Option<String> {
        match self.confirmation.reply(&message.sender, &message.text) {
            Resolution::Accepted(action) => {
                let outcome = self.perform(action);
                return Some(render_outcome(outcome));
            }
            Resolution::Declined(_) => return Some("Cancelled.".to_string()),
            Resolution::Unrelated => {}
        }

        let (command, args) = parse_command(&message.text, &self.config.marker)?;
        debug!(sender = %message.sender, ?command, args, "dispatching");
        let outcome = self.execute(command, args, &message.sender);
        Some(render_outcome(outcome))
    }

    fn execute(&mut self, command: Command, args: &str, sender: &PlayerId) -> Result<String, GameError> {
        match command {
            Command::AddConsequence => self.add_consequence(sender, args),
            Command::AddMove => self.add_move(sender, args),
            Command::AddToPool => self.add_to_pool(sender, args),
            Command::DeleteConsequence => self.delete_consequence(sender, args),
            Command::DeleteMove => self.delete_move(sender, args),
            Command::RemoveFromPool => self.remove_from_pool(sender, args),
            Command::AddCharacter => self.add_character(args),
            Command::Call => self.call(sender, args),
            Command::Clear => self.clear(args),
            Command::DeleteCharacter => self.delete_character(sender),
            Command::NewGame => self.new_game(sender, args),
            Command::Raise => self.raise(sender, args),
            Command::RenameCharacter => self.rename_character(sender, args),
            Command::Roll => self.roll(sender, args),
            Command::SetCharacter => self.set_character(sender, args),
            Command::View => self.view(sender, args),
        }
    }

    fn perform(&mut self, action: PendingAction) -> Result<String, GameError> {
        match action {
            PendingAction::ArchiveCharacter(requested) => {
                // Re-read: the character may have been renamed or deleted
                // while the question was open.
                let character = self.registry.store().character(requested.id)?;
                if !character.active {
                    return Err(GameError::not_found("character", &requested.char_id.to_string()));
                }
                self.registry.archive(&character)?;
                Ok(format!("Deleted {}.", character.name))
            }
            PendingAction::NewGame(names) => self.start_new_game(&names),
        }
    }

    // =========================================================================
    // Characters
    // =========================================================================

    fn add_character(&mut self, name: &str) -> Result<String, GameError> {
        let character = self.registry.create(name)?;
        Ok(format!("Added {} ({}).", character.name, character.char_id))
    }

    fn delete_character(&mut self, sender: &PlayerId) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        self.confirmation.request(
            PendingAction::ArchiveCharacter(character),
            sender.clone(),
            self.config.confirm_policy,
        )
    }

    fn set_character(&mut self, sender: &PlayerId, indicator: &str) -> Result<String, GameError> {
        let character = self.registry.resolve_by_indicator(indicator)?;
        let character = self.registry.bind_player(&character, sender)?;
        Ok(format!("{sender} is now playing {} ({}).", character.name, character.char_id))
    }

    fn rename_character(&mut self, sender: &PlayerId, name: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let old_name = character.name.clone();
        let character = self.registry.rename(&character, name)?;
        Ok(format!("{old_name} is now {} ({}).", character.name, character.char_id))
    }

    fn new_game(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let names = parse_names(args);
        if self.registry.list_active()?.is_empty() {
            return self.start_new_game(&names);
        }
        self.confirmation.request(
            PendingAction::NewGame(names),
            sender.clone(),
            self.config.confirm_policy,
        )
    }

    fn start_new_game(&mut self, names: &[String]) -> Result<String, GameError> {
        let archived = self.registry.archive_all()?;
        let mut out = format!("New game! Archived {archived} character(s).");
        for name in names {
            let character = self.registry.create(name)?;
            out.push_str(&format!("\nAdded {} ({}).", character.name, character.char_id));
        }
        info!(archived, created = names.len(), "new game started");
        Ok(out)
    }

    // =========================================================================
    // Dice pool
    // =========================================================================

    fn add_to_pool(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let mut sheet = self.registry.sheet(&character);

        if let Ok(dice) = Dice::parse(args) {
            let result = dice.roll_with_rng(&mut self.rng);
            let pool = sheet.add_to_pool(&result.rolls)?;
            return Ok(format!(
                "{} rolled {dice}: {result}\nDice pool: {}",
                character.name,
                pool.render()
            ));
        }

        if looks_like_values(args) {
            let values = parse_values(args)?;
            let pool = sheet.add_to_pool(&values)?;
            return Ok(format!("{} dice pool: {}", character.name, pool.render()));
        }

        let (mv, result, pool) = sheet.bank_move(args, &mut self.rng)?;
        Ok(format!(
            "{} used {} ({}): {result}\nDice pool: {}",
            character.name,
            mv.label,
            mv.dice,
            pool.render()
        ))
    }

    fn remove_from_pool(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let values = required_values(args)?;
        let character = self.registry.player_character(sender)?;
        let pool = self.registry.sheet(&character).remove_from_pool(&values)?;
        Ok(format!("{} dice pool: {}", character.name, pool.render()))
    }

    fn raise(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let values = required_values(args)?;
        if values.len() > 2 {
            return Err(GameError::RaiseArity(values.len()));
        }
        self.spend(sender, &values, "raises")
    }

    fn call(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let values = required_values(args)?;
        self.spend(sender, &values, "calls")
    }

    fn spend(&mut self, sender: &PlayerId, values: &[u32], verb: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let pool = self.registry.sheet(&character).remove_from_pool(values)?;
        Ok(format!(
            "{} {verb} with {}\nDice pool: {}",
            character.name,
            format_total(values),
            pool.render()
        ))
    }

    fn clear(&mut self, args: &str) -> Result<String, GameError> {
        let target = parse_clear(args)?;
        let dice = matches!(target, ClearTarget::DicePools | ClearTarget::Pools);
        let consequences = matches!(target, ClearTarget::ConsequencePools | ClearTarget::Pools);

        for character in self.registry.list_active()? {
            let mut sheet = self.registry.sheet(&character);
            if dice {
                sheet.clear_pool()?;
                sheet.reset_moves()?;
            }
            if consequences {
                sheet.clear_consequences()?;
            }
        }

        Ok(match target {
            ClearTarget::DicePools => "Cleared all dice pools and reset all moves.",
            ClearTarget::ConsequencePools => "Cleared all consequence pools.",
            ClearTarget::Pools => "Cleared all dice pools and consequence pools, and reset all moves.",
        }
        .to_string())
    }

    // =========================================================================
    // Moves and consequences
    // =========================================================================

    fn add_move(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let mv = self.registry.sheet(&character).add_move(args)?;
        Ok(format!("Added move {} - {} - {} to {}.", mv.char_id, mv.dice, mv.label, character.name))
    }

    fn delete_move(&mut self, sender: &PlayerId, indicator: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let mv = self.registry.sheet(&character).delete_move(indicator)?;
        Ok(format!("Removed move {} from {}.", mv.label, character.name))
    }

    fn add_consequence(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let consequence = self.registry.sheet(&character).add_consequence(args)?;
        Ok(format!(
            "Added consequence {} - {} to {}.",
            consequence.char_id, consequence.dice, character.name
        ))
    }

    fn delete_consequence(&mut self, sender: &PlayerId, indicator: &str) -> Result<String, GameError> {
        let character = self.registry.player_character(sender)?;
        let consequence = self.registry.sheet(&character).delete_consequence(indicator)?;
        Ok(format!(
            "Removed consequence {} - {} from {}.",
            consequence.char_id, consequence.dice, character.name
        ))
    }

    fn roll(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        if let Ok(dice) = Dice::parse(args) {
            let result = dice.roll_with_rng(&mut self.rng);
            return Ok(format!("Rolled {dice}: {result}"));
        }

        let character = self.registry.player_character(sender)?;
        let mut sheet = self.registry.sheet(&character);

        if args.trim() == "cs" {
            let report = sheet.roll_consequences(&mut self.rng)?;
            return Ok(format!("{} rolls their consequences:\n{report}", character.name));
        }

        let (mv, result) = sheet.roll_move(args, &mut self.rng)?;
        Ok(format!("{} used {} ({}): {result}", character.name, mv.label, mv.dice))
    }

    // =========================================================================
    // Views
    // =========================================================================

    fn view(&mut self, sender: &PlayerId, args: &str) -> Result<String, GameError> {
        match parse_view(args) {
            ViewRequest::Target(ViewTarget::Characters) => {
                let lines: Vec<String> = self
                    .registry
                    .list_active()?
                    .iter()
                    .map(character_line)
                    .collect();
                Ok(block(&join_or_empty(lines)))
            }
            ViewRequest::Target(ViewTarget::DicePools) => {
                let mut lines = Vec::new();
                for character in self.registry.list_active()? {
                    let pool = self.registry.sheet(&character).render_pool()?;
                    lines.push(format!("{} - {}: {pool}", character.char_id, character.name));
                }
                Ok(block(&join_or_empty(lines)))
            }
            ViewRequest::Target(ViewTarget::DicePool) => {
                let character = self.registry.player_character(sender)?;
                let pool = self.registry.sheet(&character).render_pool()?;
                Ok(format!("{} dice pool: {pool}", character.name))
            }
            ViewRequest::Target(ViewTarget::ConsequencePool) => {
                let character = self.registry.player_character(sender)?;
                let list = self.registry.sheet(&character).render_consequences()?;
                Ok(format!("{} consequences:\n{}", character.name, block(&list)))
            }
            ViewRequest::Target(ViewTarget::Moves) => {
                let character = self.registry.player_character(sender)?;
                let list = self.registry.sheet(&character).render_moves()?;
                Ok(format!("{} moves:\n{}", character.name, block(&list)))
            }
            ViewRequest::Target(ViewTarget::Sheet) => {
                let character = self.registry.player_character(sender)?;
                self.sheet_text(&character)
            }
            ViewRequest::Character(indicator) => {
                let character = self.registry.resolve_by_indicator(indicator)?;
                self.sheet_text(&character)
            }
        }
    }

    fn sheet_text(&mut self, character: &Character) -> Result<String, GameError> {
        Ok(block(&self.registry.sheet(character).render_sheet()?))
    }
}

/// Turn a handler result into reply text. Rejected input and internal
/// failures get different prefixes.
fn render_outcome(outcome: Result<String, GameError>) -> String {
    match outcome {
        Ok(text) => text,
        Err(err) if err.is_internal() => {
            warn!(error = %err, "command failed");
            format!("[INTERNAL ERROR] {err}")
        }
        Err(err) => {
            debug!(error = %err, "command rejected");
            format!("[ERROR] {err}")
        }
    }
}

fn required_values(args: &str) -> Result<Vec<u32>, GameError> {
    let values = parse_values(args)?;
    if values.is_empty() {
        return Err(GameError::InvalidNumber(args.trim().to_string()));
    }
    Ok(values)
}

fn join_or_empty(lines: Vec<String>) -> String {
    if lines.is_empty() {
        EMPTY.to_string()
    } else {
        lines.join("\n")
    }
}
