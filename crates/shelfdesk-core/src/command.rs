// ── Command API ──
//
// Every mutation the dashboard can perform. Each one is a single,
// independent request; a success triggers a full reload.

use serde_json::Value;

use shelfdesk_api::{NewBook, NewMember};

use crate::entity::{EntityKind, FormData};

/// A mutation to run against the library API.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateBook(NewBook),
    CreateMember(NewMember),
    Borrow { book_id: u64, member_id: u64 },
    Update { kind: EntityKind, id: u64, data: FormData },
    Delete { kind: EntityKind, id: u64 },
}

impl Command {
    /// Message used when the server rejects this command without detail.
    pub fn fallback_message(&self) -> String {
        match self {
            Self::Delete { kind, .. } => format!("Failed to delete {}", kind.label()),
            _ => crate::error::GENERIC_FAILURE.to_owned(),
        }
    }
}

/// Result of a successful command. Bodies are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Ok,
    Created(Value),
    Updated(Value),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_fallback_names_the_entity() {
        let cmd = Command::Delete {
            kind: EntityKind::Member,
            id: 3,
        };
        assert_eq!(cmd.fallback_message(), "Failed to delete member");

        let cmd = Command::Borrow {
            book_id: 1,
            member_id: 2,
        };
        assert_eq!(cmd.fallback_message(), "Something went wrong");
    }
}
