//! Shared helpers for command handlers.

use dialoguer::{Confirm, Input};

use shelfdesk_core::{EntityKind, FieldDescriptor};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Ask for one line of text. An empty answer is allowed.
pub fn prompt_text(label: &str, initial: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input.interact_text().map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Split `field=value` assignments and check each field is editable.
pub fn parse_assignments(
    kind: EntityKind,
    raw: &[String],
) -> Result<Vec<(&'static FieldDescriptor, String)>, CliError> {
    raw.iter()
        .map(|pair| {
            let (key, value) = pair.split_once('=').ok_or_else(|| CliError::Validation {
                field: "set".into(),
                reason: format!("expected FIELD=VALUE, got '{pair}'"),
            })?;
            let key = key.trim();
            let field = kind.edit_field(key).ok_or_else(|| CliError::Validation {
                field: key.to_owned(),
                reason: format!(
                    "not an editable {} field (expected one of: {})",
                    kind.label(),
                    field_names(kind.edit_fields())
                ),
            })?;
            Ok((field, value.to_owned()))
        })
        .collect()
}

fn field_names(fields: &[FieldDescriptor]) -> String {
    fields.iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
}

/// The not-found error for an entity ID.
pub fn not_found(kind: EntityKind, id: u64) -> CliError {
    CliError::NotFound {
        resource_type: kind.label().into(),
        identifier: id.to_string(),
        list_command: format!("{} list", kind.endpoint()),
    }
}
