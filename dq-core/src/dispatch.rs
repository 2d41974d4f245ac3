//! Command recognition.
//!
//! Commands are matched by scanning ordered tables of literal prefixes; the
//! first entry that matches wins. Where two prefixes overlap the longer one is
//! listed first (`+c` before `+`), so table order is part of the grammar.

use crate::error::GameError;

/// Every top-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddConsequence,
    AddMove,
    AddToPool,
    DeleteConsequence,
    DeleteMove,
    RemoveFromPool,
    AddCharacter,
    Call,
    Clear,
    DeleteCharacter,
    NewGame,
    Raise,
    RenameCharacter,
    Roll,
    SetCharacter,
    View,
}

/// Top-level commands in match order.
pub const COMMANDS: &[(&str, Command)] = &[
    ("+c", Command::AddConsequence),
    ("+m", Command::AddMove),
    ("+", Command::AddToPool),
    ("-c", Command::DeleteConsequence),
    ("-m", Command::DeleteMove),
    ("-", Command::RemoveFromPool),
    ("add char", Command::AddCharacter),
    ("call", Command::Call),
    ("clear", Command::Clear),
    ("del char", Command::DeleteCharacter),
    ("new game", Command::NewGame),
    ("raise", Command::Raise),
    ("rename char", Command::RenameCharacter),
    ("roll", Command::Roll),
    ("set char", Command::SetCharacter),
    ("view", Command::View),
];

/// What `view` can show besides a named character's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTarget {
    Characters,
    ConsequencePool,
    DicePools,
    DicePool,
    Moves,
    Sheet,
}

pub const VIEW_TARGETS: &[(&str, ViewTarget)] = &[
    ("characters", ViewTarget::Characters),
    ("chars", ViewTarget::Characters),
    ("cpool", ViewTarget::ConsequencePool),
    ("dpools", ViewTarget::DicePools),
    ("dpool", ViewTarget::DicePool),
    ("moves", ViewTarget::Moves),
    ("sheet", ViewTarget::Sheet),
    ("char", ViewTarget::Sheet),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    ConsequencePools,
    DicePools,
    Pools,
}

pub const CLEAR_TARGETS: &[(&str, ClearTarget)] = &[
    ("cpools", ClearTarget::ConsequencePools),
    ("dpools", ClearTarget::DicePools),
    ("pools", ClearTarget::Pools),
];

/// Parsed `view` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRequest<'a> {
    Target(ViewTarget),
    /// Fallback: the sheet of the indicated character.
    Character(&'a str),
}

/// First table entry whose prefix starts `text`, plus the text after it.
pub fn match_prefix<'a, T: Copy>(table: &[(&str, T)], text: &'a str) -> Option<(T, &'a str)> {
    table.iter().find_map(|&(prefix, item)| {
        text.strip_prefix(prefix)
            .map(|rest| (item, rest.trim_start()))
    })
}

/// Like [`match_prefix`], but the prefix must be a whole word.
pub fn match_word<'a, T: Copy>(table: &[(&str, T)], text: &'a str) -> Option<(T, &'a str)> {
    table.iter().find_map(|&(word, item)| {
        let rest = text.strip_prefix(word)?;
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            Some((item, rest.trim_start()))
        } else {
            None
        }
    })
}

/// Strip the command marker (`"dq "`). Anything else is not a command.
pub fn strip_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.strip_prefix(marker)?.strip_prefix(' ')
}

/// Recognise a full message as a command.
pub fn parse_command<'a>(text: &'a str, marker: &str) -> Option<(Command, &'a str)> {
    let body = strip_marker(text.trim(), marker)?.trim_start();
    match_prefix(COMMANDS, body)
}

pub fn parse_view(args: &str) -> ViewRequest<'_> {
    let args = args.trim();
    if args.is_empty() {
        return ViewRequest::Target(ViewTarget::Sheet);
    }
    match match_word(VIEW_TARGETS, args) {
        Some((target, _)) => ViewRequest::Target(target),
        None => ViewRequest::Character(args),
    }
}

pub fn parse_clear(args: &str) -> Result<ClearTarget, GameError> {
    let args = args.trim();
    match_word(CLEAR_TARGETS, args)
        .map(|(target, _)| target)
        .ok_or_else(|| GameError::UnknownClearTarget(args.to_string()))
}

/// Die values separated by spaces or commas. Each must be at least 1.
pub fn parse_values(args: &str) -> Result<Vec<u32>, GameError> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<u32>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(GameError::InvalidNumber(token.to_string())),
        })
        .collect()
}

/// Whether `args` is a list of digit-only tokens, i.e. meant as die values
/// rather than a move indicator.
pub fn looks_like_values(args: &str) -> bool {
    let mut tokens = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .peekable();
    tokens.peek().is_some() && tokens.all(|token| token.chars().all(|c| c.is_ascii_digit()))
}

/// Comma-separated character names.
pub fn parse_names(args: &str) -> Vec<String> {
    args.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker() {
        assert_eq!(parse_command("dq roll 2d6", "dq"), Some((Command::Roll, "2d6")));
        assert_eq!(parse_command("dqroll 2d6", "dq"), None);
        assert_eq!(parse_command("DQ roll 2d6", "dq"), None);
        assert_eq!(parse_command("hello there", "dq"), None);
        assert_eq!(parse_command("dq", "dq"), None);
    }

    #[test]
    fn test_longer_prefix_wins() {
        assert_eq!(parse_command("dq +c 1d6 Hurt", "dq"), Some((Command::AddConsequence, "1d6 Hurt")));
        assert_eq!(parse_command("dq +m 2d6 Punch", "dq"), Some((Command::AddMove, "2d6 Punch")));
        assert_eq!(parse_command("dq + 3", "dq"), Some((Command::AddToPool, "3")));
        assert_eq!(parse_command("dq +3d6", "dq"), Some((Command::AddToPool, "3d6")));
        assert_eq!(parse_command("dq -c A", "dq"), Some((Command::DeleteConsequence, "A")));
        assert_eq!(parse_command("dq -m A", "dq"), Some((Command::DeleteMove, "A")));
        assert_eq!(parse_command("dq - 5 5", "dq"), Some((Command::RemoveFromPool, "5 5")));
    }

    #[test]
    fn test_word_commands() {
        assert_eq!(parse_command("dq add char Ann", "dq"), Some((Command::AddCharacter, "Ann")));
        assert_eq!(parse_command("dq del char", "dq"), Some((Command::DeleteCharacter, "")));
        assert_eq!(parse_command("dq rename char Bo", "dq"), Some((Command::RenameCharacter, "Bo")));
        assert_eq!(parse_command("dq new game Ann, Bob", "dq"), Some((Command::NewGame, "Ann, Bob")));
        assert_eq!(parse_command("dq dance", "dq"), None);
    }

    #[test]
    fn test_custom_marker() {
        assert_eq!(parse_command("!g view chars", "!g"), Some((Command::View, "chars")));
        assert_eq!(parse_command("dq view chars", "!g"), None);
    }

    #[test]
    fn test_view_table() {
        assert_eq!(parse_view("chars"), ViewRequest::Target(ViewTarget::Characters));
        assert_eq!(parse_view("characters"), ViewRequest::Target(ViewTarget::Characters));
        assert_eq!(parse_view("dpools"), ViewRequest::Target(ViewTarget::DicePools));
        assert_eq!(parse_view("dpool"), ViewRequest::Target(ViewTarget::DicePool));
        assert_eq!(parse_view("cpool"), ViewRequest::Target(ViewTarget::ConsequencePool));
        assert_eq!(parse_view("char"), ViewRequest::Target(ViewTarget::Sheet));
        assert_eq!(parse_view(""), ViewRequest::Target(ViewTarget::Sheet));
        assert_eq!(parse_view("charlie"), ViewRequest::Character("charlie"));
        assert_eq!(parse_view("B"), ViewRequest::Character("B"));
    }

    #[test]
    fn test_clear_table() {
        assert_eq!(parse_clear("cpools").unwrap(), ClearTarget::ConsequencePools);
        assert_eq!(parse_clear("dpools").unwrap(), ClearTarget::DicePools);
        assert_eq!(parse_clear("pools").unwrap(), ClearTarget::Pools);
        assert!(matches!(parse_clear("moves"), Err(GameError::UnknownClearTarget(_))));
        assert!(matches!(parse_clear(""), Err(GameError::UnknownClearTarget(_))));
    }

    #[test]
    fn test_values_and_names() {
        assert_eq!(parse_values("5 3,2").unwrap(), vec![5, 3, 2]);
        assert!(matches!(parse_values("5 x"), Err(GameError::InvalidNumber(_))));
        assert!(matches!(parse_values("3 0"), Err(GameError::InvalidNumber(ref t)) if t == "0"));
        assert_eq!(parse_names(" Ann, Bob ,, Cat"), vec!["Ann", "Bob", "Cat"]);
        assert!(looks_like_values("4, 0 12"));
        assert!(!looks_like_values("punch"));
        assert!(!looks_like_values("4 A"));
        assert!(!looks_like_values("  "));
    }
}
