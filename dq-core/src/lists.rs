//! A character's dice pool, move list and consequence list.

use crate::dice::{format_total, Dice, RollResult};
use crate::error::GameError;
use crate::ids::{next_free_id, IdScope};
use crate::model::{resolve_indicator, Character, Consequence, DicePool, Move, RecordId};
use crate::render::{render_list, ListItem};
use crate::store::EntityStore;
use rand::Rng;
use std::fmt;
use tracing::{debug, warn};

/// Split `"<dice> <label>"` into its parts. The label may be empty.
fn split_formula(text: &str) -> Result<(Dice, String), GameError> {
    let text = text.trim();
    let (dice, label) = text
        .split_once(char::is_whitespace)
        .unwrap_or((text, ""));
    Ok((Dice::parse(dice)?, label.trim().to_string()))
}

/// Pool, move and consequence operations for one character.
pub struct Sheet<'a, S> {
    store: &'a mut S,
    character: Character,
}

impl<'a, S: EntityStore> Sheet<'a, S> {
    pub fn new(store: &'a mut S, character: Character) -> Self {
        Self { store, character }
    }

    // =========================================================================
    // Dice pool
    // =========================================================================

    pub fn pool(&self) -> Result<DicePool, GameError> {
        Ok(DicePool::from_text(&self.store.pool(self.character.id)?)?)
    }

    /// Append values to the end of the pool.
    pub fn add_to_pool(&mut self, values: &[u32]) -> Result<DicePool, GameError> {
        let mut pool = self.pool()?;
        pool.extend(values);
        self.store.set_pool(self.character.id, &pool.to_text())?;
        Ok(pool)
    }

    /// Remove one occurrence of each value, or nothing at all.
    pub fn remove_from_pool(&mut self, values: &[u32]) -> Result<DicePool, GameError> {
        let mut pool = self.pool()?;
        pool.remove(values)?;
        self.store.set_pool(self.character.id, &pool.to_text())?;
        Ok(pool)
    }

    pub fn clear_pool(&mut self) -> Result<(), GameError> {
        self.store.set_pool(self.character.id, "")?;
        Ok(())
    }

    pub fn render_pool(&self) -> Result<String, GameError> {
        Ok(self.pool()?.render())
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Moves ordered by id.
    pub fn moves(&self) -> Result<Vec<Move>, GameError> {
        let mut moves = self.store.moves_for(self.character.id)?;
        moves.sort_by_key(|mv| mv.char_id);
        Ok(moves)
    }

    /// Add a move from `"<dice> <label>"`.
    pub fn add_move(&mut self, formula: &str) -> Result<Move, GameError> {
        let (dice, label) = split_formula(formula)?;
        if label.is_empty() {
            return Err(GameError::MissingLabel);
        }
        let existing = self.store.moves_for(self.character.id)?;
        let char_id = next_free_id(IdScope::Moves, existing.iter().map(|mv| mv.char_id))?;
        let mv = Move {
            row: RecordId::new(),
            character: self.character.id,
            char_id,
            dice,
            label,
            used: false,
        };
        self.store.insert_move(mv.clone())?;
        Ok(mv)
    }

    pub fn resolve_move(&self, indicator: &str) -> Result<Move, GameError> {
        let moves = self.moves()?;
        resolve_indicator(&moves, indicator, "move").cloned()
    }

    /// Mark a move used. Fails if it already is.
    pub fn use_move(&mut self, mv: &Move) -> Result<(), GameError> {
        let current = self
            .store
            .moves_for(self.character.id)?
            .into_iter()
            .find(|m| m.row == mv.row)
            .ok_or_else(|| GameError::not_found("move", &mv.char_id.to_string()))?;
        if current.used {
            return Err(GameError::AlreadyUsed { label: current.label });
        }
        self.store.set_move_used(mv.row, true)?;
        Ok(())
    }

    /// Use up the indicated move and roll its dice.
    ///
    /// The used check happens before anything is rolled.
    pub fn roll_move<R: Rng + ?Sized>(
        &mut self,
        indicator: &str,
        rng: &mut R,
    ) -> Result<(Move, RollResult), GameError> {
        let mv = self.resolve_move(indicator)?;
        self.use_move(&mv)?;
        let result = mv.dice.roll_with_rng(rng);
        debug!(char_id = %self.character.char_id, mv = %mv.label, rolls = ?result.rolls, "move rolled");
        Ok((mv, result))
    }

    /// Roll the indicated move into the pool.
    ///
    /// If the pool cannot be written the move is marked unused again, so a
    /// failed bank never burns the move.
    pub fn bank_move<R: Rng + ?Sized>(
        &mut self,
        indicator: &str,
        rng: &mut R,
    ) -> Result<(Move, RollResult, DicePool), GameError> {
        let (mv, result) = self.roll_move(indicator, rng)?;
        match self.add_to_pool(&result.rolls) {
            Ok(pool) => Ok((mv, result, pool)),
            Err(err) => {
                if let Err(reset) = self.store.set_move_used(mv.row, false) {
                    warn!(mv = %mv.label, error = %reset, "could not release move after failed bank");
                }
                Err(err)
            }
        }
    }

    pub fn delete_move(&mut self, indicator: &str) -> Result<Move, GameError> {
        let mv = self.resolve_move(indicator)?;
        self.store.delete_move(mv.row)?;
        Ok(mv)
    }

    /// Mark every move unused again.
    pub fn reset_moves(&mut self) -> Result<(), GameError> {
        for mv in self.store.moves_for(self.character.id)? {
            if mv.used {
                self.store.set_move_used(mv.row, false)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Consequences
    // =========================================================================

    pub fn consequences(&self) -> Result<Vec<Consequence>, GameError> {
        let mut consequences = self.store.consequences_for(self.character.id)?;
        consequences.sort_by_key(|c| c.char_id);
        Ok(consequences)
    }

    /// Add a consequence from `"<dice> [label]"`.
    pub fn add_consequence(&mut self, formula: &str) -> Result<Consequence, GameError> {
        let (dice, label) = split_formula(formula)?;
        let existing = self.store.consequences_for(self.character.id)?;
        let char_id = next_free_id(IdScope::Consequences, existing.iter().map(|c| c.char_id))?;
        let consequence = Consequence {
            row: RecordId::new(),
            character: self.character.id,
            char_id,
            dice,
            label,
        };
        self.store.insert_consequence(consequence.clone())?;
        Ok(consequence)
    }

    pub fn delete_consequence(&mut self, indicator: &str) -> Result<Consequence, GameError> {
        let consequences = self.consequences()?;
        let consequence = resolve_indicator(&consequences, indicator, "consequence")?.clone();
        self.store.delete_consequence(consequence.row)?;
        Ok(consequence)
    }

    pub fn clear_consequences(&mut self) -> Result<(), GameError> {
        self.store.delete_consequences_for(self.character.id)?;
        Ok(())
    }

    /// Roll every consequence, then delete them all.
    pub fn roll_consequences<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<ConsequenceReport, GameError> {
        let consequences = self.consequences()?;
        if consequences.is_empty() {
            return Err(GameError::EmptyConsequencePool);
        }
        let rolls = consequences
            .into_iter()
            .map(|c| {
                let result = c.dice.roll_with_rng(&mut *rng);
                (c, result)
            })
            .collect();
        let report = ConsequenceReport::from_rolls(rolls);
        self.clear_consequences()?;
        Ok(report)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn render_moves(&self) -> Result<String, GameError> {
        Ok(render_list(&self.moves()?))
    }

    pub fn render_consequences(&self) -> Result<String, GameError> {
        Ok(render_list(&self.consequences()?))
    }

    /// The full character sheet.
    pub fn render_sheet(&self) -> Result<String, GameError> {
        let mut out = format!("{} ({})", self.character.name, self.character.char_id);
        if let Some(player) = &self.character.player {
            out.push_str(&format!(" - played by {player}"));
        }
        out.push_str(&format!("\n\nDice pool: {}", self.render_pool()?));
        out.push_str(&format!("\n\nMoves:\n{}", self.render_moves()?));
        out.push_str(&format!("\n\nConsequences:\n{}", self.render_consequences()?));
        Ok(out)
    }
}

/// Result of rolling a character's whole consequence pool.
#[derive(Debug, Clone)]
pub struct ConsequenceReport {
    pub rolls: Vec<(Consequence, RollResult)>,
    /// The two highest dice across every consequence, highest first.
    pub top_two: Vec<u32>,
    /// How many dice came up 1.
    pub ones: usize,
}

impl ConsequenceReport {
    pub fn from_rolls(rolls: Vec<(Consequence, RollResult)>) -> Self {
        let mut all: Vec<u32> = rolls
            .iter()
            .flat_map(|(_, result)| result.rolls.iter().copied())
            .collect();
        all.sort_by(|a, b| b.cmp(a));
        let ones = all.iter().filter(|&&r| r == 1).count();
        all.truncate(2);
        Self {
            rolls,
            top_two: all,
            ones,
        }
    }
}

impl fmt::Display for ConsequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (consequence, result) in &self.rolls {
            writeln!(f, "{}: {}", consequence.line(), format_total(&result.rolls))?;
        }
        writeln!(f, "Top two: {}", format_total(&self.top_two))?;
        write!(f, "Ones: {}", self.ones)
    }
}
