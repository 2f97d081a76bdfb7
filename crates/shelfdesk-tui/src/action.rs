//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use shelfdesk_core::actions::delete_prompt;
use shelfdesk_core::{ActionOutcome, Book, EntityKind, Loan, Member};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    /// Toast for a finished dashboard action. Cancelled actions show nothing.
    pub fn from_outcome(outcome: &ActionOutcome) -> Option<Self> {
        match outcome {
            ActionOutcome::Cancelled => None,
            ActionOutcome::Completed(msg) => Some(Self::success(msg.clone())),
            ActionOutcome::Failed(msg) => Some(Self::error(msg.clone())),
        }
    }
}

/// Destructive actions that need a y/n answer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete { kind: EntityKind, id: u64 },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { kind, .. } => f.write_str(&delete_prompt(*kind)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ───────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Data (from the data bridge) ─────────────────────────────────
    BooksUpdated(Arc<Vec<Arc<Book>>>),
    MembersUpdated(Arc<Vec<Arc<Member>>>),
    LoansUpdated(Arc<Vec<Arc<Loan>>>),
    LoadingChanged(bool),

    // ── Dialogs ─────────────────────────────────────────────────────
    OpenCreate(EntityKind),
    OpenEdit(EntityKind, u64),
    SubmitForm,
    /// A create request settled; `Err` carries the message to show inline.
    CreateFinished(Result<(), String>),
    CloseDialog,

    // ── Row actions ─────────────────────────────────────────────────
    RequestBorrow(u64),
    SubmitBorrow,
    RequestDelete(EntityKind, u64),
    ConfirmYes,
    ConfirmNo,

    Notify(Notification),
}
