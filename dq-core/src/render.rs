//! Plain-text rendering of lists and sheets.

use crate::model::{Character, Consequence, Move};

/// Placeholder for empty pools and lists.
pub const EMPTY: &str = "empty";

/// Wrap text in a monospace block so columns line up in chat.
pub fn block(text: &str) -> String {
    format!("```\n{text}\n```")
}

/// Mark text as struck out.
pub fn strike(text: &str) -> String {
    format!("~~{text}~~")
}

/// A row in a move or consequence listing.
pub trait ListItem {
    fn line(&self) -> String;
    fn is_used(&self) -> bool {
        false
    }
    fn sort_key(&self) -> char;
}

impl ListItem for Move {
    fn line(&self) -> String {
        format!("{} - {} - {}", self.char_id, self.dice, self.label)
    }

    fn is_used(&self) -> bool {
        self.used
    }

    fn sort_key(&self) -> char {
        self.char_id
    }
}

impl ListItem for Consequence {
    fn line(&self) -> String {
        if self.label.is_empty() {
            format!("{} - {}", self.char_id, self.dice)
        } else {
            format!("{} - {} - {}", self.char_id, self.dice, self.label)
        }
    }

    fn sort_key(&self) -> char {
        self.char_id
    }
}

/// One line per item ordered by id, used items struck out.
pub fn render_list<T: ListItem>(items: &[T]) -> String {
    if items.is_empty() {
        return EMPTY.to_string();
    }
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| item.sort_key());
    sorted
        .into_iter()
        .map(|item| {
            if item.is_used() {
                strike(&item.line())
            } else {
                item.line()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Name (X)` plus the bound player, if any.
pub fn character_line(character: &Character) -> String {
    match &character.player {
        Some(player) => format!("{} - {} (played by {})", character.char_id, character.name, player),
        None => format!("{} - {}", character.char_id, character.name),
    }
}
