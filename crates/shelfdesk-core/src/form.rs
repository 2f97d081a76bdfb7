// ── Dialog state machines ──
//
// Create and edit dialogs share one lifecycle:
// closed -> editing -> submitting -> closed. No retries, no partial saves.
// A failed create returns to editing with the server message inline; a
// failed edit still closes and reports through a notification.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use shelfdesk_api::{NewBook, NewMember};

use crate::actions::{self, ActionOutcome};
use crate::command::Command;
use crate::controller::Controller;
use crate::entity::{EntityKind, FieldDescriptor, FormData};
use crate::error::CoreError;

/// Where a dialog is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Editing,
    Submitting,
}

// ── Create dialog ────────────────────────────────────────────────

/// The "Add Book" / "Add Member" dialog.
#[derive(Debug, Clone)]
pub struct EntityForm {
    kind: EntityKind,
    state: DialogState,
    values: FormData,
    error: Option<String>,
}

impl EntityForm {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            state: DialogState::Closed,
            values: FormData::new(),
            error: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn title(&self) -> &'static str {
        self.kind.create_title()
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.kind.create_fields()
    }

    /// Inline error from the last failed submit.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn values(&self) -> &FormData {
        &self.values
    }

    /// Open with every field blank.
    pub fn open(&mut self) {
        self.values = self
            .fields()
            .iter()
            .map(|f| (f.name.to_owned(), Value::String(String::new())))
            .collect();
        self.error = None;
        self.state = DialogState::Editing;
    }

    pub fn close(&mut self) {
        self.state = DialogState::Closed;
        self.values.clear();
        self.error = None;
    }

    /// Update one field from raw input text.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), CoreError> {
        let field = self
            .fields()
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| CoreError::validation(format!("unknown field: {name}")))?;
        let value = field.input.coerce(raw)?;
        self.values.insert(field.name.to_owned(), value);
        Ok(())
    }

    pub fn field_text(&self, name: &str) -> String {
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.display_value(self.values.get(name)))
            .unwrap_or_default()
    }

    /// The create command for the current values.
    pub fn command(&self) -> Command {
        match self.kind {
            EntityKind::Book => Command::CreateBook(NewBook {
                title: self.field_text("title"),
                author: self.field_text("author"),
            }),
            EntityKind::Member => Command::CreateMember(NewMember {
                name: self.field_text("name"),
                email: self.field_text("email"),
                mobile: self.field_text("mobile"),
            }),
        }
    }

    /// Move to `Submitting` and hand back the command to run.
    /// `None` unless the dialog is editing.
    pub fn begin_submit(&mut self) -> Option<Command> {
        if self.state != DialogState::Editing {
            return None;
        }
        self.state = DialogState::Submitting;
        self.error = None;
        Some(self.command())
    }

    /// Settle a submit: close on success, back to editing with the message
    /// on failure.
    pub fn finish(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => self.close(),
            Err(message) => {
                debug!(kind = %self.kind, %message, "create rejected");
                self.error = Some(message);
                self.state = DialogState::Editing;
            }
        }
    }

    /// Submit through `controller`. Returns `true` when the entity was created.
    pub async fn submit(&mut self, controller: &Controller) -> bool {
        let Some(cmd) = self.begin_submit() else {
            return false;
        };
        let result = controller
            .execute(cmd)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string());
        let created = result.is_ok();
        self.finish(result);
        created
    }
}

// ── Generic edit dialog ──────────────────────────────────────────

/// The "Edit Book" / "Edit Member" dialog for one existing entity.
#[derive(Debug, Clone)]
pub struct EditForm {
    kind: EntityKind,
    id: u64,
    state: DialogState,
    values: FormData,
    /// Values as loaded from the entity.
    loaded: FormData,
}

impl EditForm {
    /// Open pre-populated from an entity snapshot.
    pub fn open<E: Serialize>(kind: EntityKind, id: u64, entity: &E) -> Self {
        let source = serde_json::to_value(entity).unwrap_or(Value::Null);
        let loaded: FormData = kind
            .edit_fields()
            .iter()
            .filter_map(|f| {
                source
                    .get(f.name)
                    .filter(|v| !v.is_null())
                    .map(|v| (f.name.to_owned(), v.clone()))
            })
            .collect();

        Self {
            kind,
            id,
            state: DialogState::Editing,
            values: loaded.clone(),
            loaded,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn title(&self) -> &'static str {
        self.kind.edit_title()
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.kind.edit_fields()
    }

    pub fn values(&self) -> &FormData {
        &self.values
    }

    pub fn field_text(&self, name: &str) -> String {
        self.kind
            .edit_field(name)
            .map(|f| f.display_value(self.values.get(name)))
            .unwrap_or_default()
    }

    /// Update one field, coercing number inputs as they change.
    ///
    /// Text identical to the loaded value's display text puts the loaded
    /// value back, so a field the entity never had stays out of the update.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), CoreError> {
        let field = self
            .kind
            .edit_field(name)
            .ok_or_else(|| CoreError::validation(format!("unknown field: {name}")))?;
        let loaded = self.loaded.get(field.name);
        if raw == field.display_value(loaded) {
            match loaded {
                Some(value) => self.values.insert(field.name.to_owned(), value.clone()),
                None => self.values.shift_remove(field.name),
            };
            return Ok(());
        }
        let value = field.input.coerce(raw)?;
        self.values.insert(field.name.to_owned(), value);
        Ok(())
    }

    /// Move to `Submitting` and hand back the update command.
    pub fn begin_submit(&mut self) -> Option<Command> {
        if self.state != DialogState::Editing {
            return None;
        }
        self.state = DialogState::Submitting;
        Some(Command::Update {
            kind: self.kind,
            id: self.id,
            data: self.values.clone(),
        })
    }

    /// Settle a submit. The dialog closes whatever the outcome.
    pub fn finish(&mut self) {
        self.state = DialogState::Closed;
    }

    /// Submit through `controller` and close.
    pub async fn submit(&mut self, controller: &Controller) -> ActionOutcome {
        if self.begin_submit().is_none() {
            return ActionOutcome::Cancelled;
        }
        let outcome =
            actions::update_entity(controller, self.kind, self.id, self.values.clone()).await;
        self.finish();
        outcome
    }
}
