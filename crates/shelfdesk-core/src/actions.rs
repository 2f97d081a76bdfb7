// ── Dashboard actions ──
//
// Borrow, update and delete as the dashboard performs them: ask the user
// where needed, run one command, and report a single displayable message.

use tracing::debug;

use crate::command::Command;
use crate::controller::Controller;
use crate::entity::{EntityKind, FormData};
use crate::error::CoreError;
use crate::prompt::Prompter;

pub const BORROW_PROMPT: &str = "Enter Member ID to borrow this book:";
pub const BORROW_SUCCESS: &str = "Book borrowed successfully";

/// How a user-initiated action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The user backed out; no request was sent.
    Cancelled,
    Completed(String),
    Failed(String),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Message to show the user, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Cancelled => None,
            Self::Completed(msg) | Self::Failed(msg) => Some(msg),
        }
    }
}

/// Confirmation text for deleting one entity.
pub fn delete_prompt(kind: EntityKind) -> String {
    format!("Are you sure you want to delete this {}?", kind.label())
}

/// Parse a member ID typed by the user. Blank input means "cancel".
pub fn parse_member_id(raw: &str) -> Result<Option<u64>, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(CoreError::validation("Member ID must be a number")),
    }
}

/// Ask for a member ID and record a loan for `book_id`.
pub async fn borrow_book(
    controller: &Controller,
    book_id: u64,
    prompter: &(dyn Prompter + Sync),
) -> ActionOutcome {
    let answer = match prompter.prompt(BORROW_PROMPT) {
        Ok(answer) => answer,
        Err(e) => return ActionOutcome::Failed(e.to_string()),
    };
    let member_id = match answer.as_deref().map(parse_member_id) {
        None | Some(Ok(None)) => {
            debug!(book_id, "borrow cancelled");
            return ActionOutcome::Cancelled;
        }
        Some(Ok(Some(id))) => id,
        Some(Err(e)) => return ActionOutcome::Failed(e.to_string()),
    };

    match controller
        .execute(Command::Borrow { book_id, member_id })
        .await
    {
        Ok(_) => ActionOutcome::Completed(BORROW_SUCCESS.to_owned()),
        Err(e) => ActionOutcome::Failed(e.to_string()),
    }
}

/// Confirm, then delete one entity.
pub async fn delete_entity(
    controller: &Controller,
    kind: EntityKind,
    id: u64,
    prompter: &(dyn Prompter + Sync),
) -> ActionOutcome {
    match prompter.confirm(&delete_prompt(kind)) {
        Ok(true) => {}
        Ok(false) => {
            debug!(%kind, id, "delete declined");
            return ActionOutcome::Cancelled;
        }
        Err(e) => return ActionOutcome::Failed(e.to_string()),
    }

    match controller.execute(Command::Delete { kind, id }).await {
        Ok(_) => ActionOutcome::Completed(format!("{} deleted", kind.title_label())),
        Err(e) => ActionOutcome::Failed(e.to_string()),
    }
}

/// Patch one entity with the edited fields.
pub async fn update_entity(
    controller: &Controller,
    kind: EntityKind,
    id: u64,
    data: FormData,
) -> ActionOutcome {
    match controller.execute(Command::Update { kind, id, data }).await {
        Ok(_) => ActionOutcome::Completed(format!("{} updated", kind.title_label())),
        Err(e) => ActionOutcome::Failed(e.to_string()),
    }
}
