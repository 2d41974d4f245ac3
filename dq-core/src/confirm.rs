//! The single yes/no gate in front of destructive commands.
//!
//! At most one confirmation is pending at a time. Only the player who asked
//! for it can answer; anybody else's "yes" or "no" passes through untouched.

use crate::error::GameError;
use crate::model::{Character, PlayerId};
use tracing::info;

/// What happens when a second confirmation is requested while one is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmPolicy {
    /// Refuse the new request; the pending one stays.
    #[default]
    Reject,
    /// Drop the pending request in favour of the new one.
    Replace,
}

impl ConfirmPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Some(ConfirmPolicy::Reject),
            "replace" => Some(ConfirmPolicy::Replace),
            _ => None,
        }
    }
}

/// A destructive action waiting on a yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Archive one character.
    ArchiveCharacter(Character),
    /// Archive everyone, then create these characters.
    NewGame(Vec<String>),
}

impl PendingAction {
    /// The question put to the requester.
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::ArchiveCharacter(character) => {
                format!("Really delete {} ({})? Reply Y or N.", character.name, character.char_id)
            }
            PendingAction::NewGame(_) => {
                "Start a new game and archive every current character? Reply Y or N.".to_string()
            }
        }
    }
}

/// A yes or a no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Answer::Yes),
            "n" | "no" => Some(Answer::No),
            _ => None,
        }
    }
}

/// Outcome of offering a message to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing pending, not an answer, or not from the requester.
    Unrelated,
    Accepted(PendingAction),
    Declined(PendingAction),
}

#[derive(Debug, Default)]
pub enum Confirmation {
    #[default]
    Idle,
    Pending {
        action: PendingAction,
        requester: PlayerId,
    },
}

impl Confirmation {
    pub fn is_pending(&self) -> bool {
        matches!(self, Confirmation::Pending { .. })
    }

    /// Park `action` until `requester` answers.
    pub fn request(
        &mut self,
        action: PendingAction,
        requester: PlayerId,
        policy: ConfirmPolicy,
    ) -> Result<String, GameError> {
        if self.is_pending() && policy == ConfirmPolicy::Reject {
            return Err(GameError::ConfirmationPending);
        }
        let prompt = action.prompt();
        info!(%requester, ?action, "confirmation requested");
        *self = Confirmation::Pending { action, requester };
        Ok(prompt)
    }

    /// Offer a message from `sender`. Returns the action to run (or drop)
    /// when the requester answered; the gate is idle again afterwards.
    pub fn reply(&mut self, sender: &PlayerId, text: &str) -> Resolution {
        let Some(answer) = Answer::parse(text) else {
            return Resolution::Unrelated;
        };
        match self {
            Confirmation::Pending { requester, .. } if *requester == *sender => {}
            _ => return Resolution::Unrelated,
        }
        let Confirmation::Pending { action, .. } = std::mem::take(self) else {
            return Resolution::Unrelated;
        };
        info!(%sender, ?answer, "confirmation answered");
        match answer {
            Answer::Yes => Resolution::Accepted(action),
            Answer::No => Resolution::Declined(action),
        }
    }
}
