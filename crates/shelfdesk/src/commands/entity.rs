//! Create, edit and delete flows shared by books and members.

use serde::Serialize;

use shelfdesk_core::actions::delete_prompt;
use shelfdesk_core::{Command, Controller, EditForm, EntityForm, EntityKind, FieldDescriptor};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Create ──────────────────────────────────────────────────────────

/// Fill the create dialog from flags, prompting for anything missing,
/// and submit it.
pub async fn add(
    controller: &Controller,
    kind: EntityKind,
    provided: &[(&str, Option<String>)],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form = EntityForm::new(kind);
    form.open();

    for field in form.fields() {
        let flag = provided
            .iter()
            .find(|(name, _)| *name == field.name)
            .and_then(|(_, value)| value.clone());
        let value = match flag {
            Some(value) => value,
            None => util::prompt_text(field.label, None)?,
        };
        form.set_field(field.name, &value)?;
    }

    let Some(cmd) = form.begin_submit() else {
        return Ok(());
    };
    match controller.execute(cmd).await {
        Ok(_) => {
            form.finish(Ok(()));
            output::success(&format!("{} created", kind.title_label()), global);
            Ok(())
        }
        Err(e) => {
            form.finish(Err(e.to_string()));
            Err(e.into())
        }
    }
}

// ── Edit ────────────────────────────────────────────────────────────

/// Run the generic edit dialog for one entity.
///
/// `assignments` (from `--set`) are applied directly; without any, each
/// editable field is prompted for with its current value pre-filled.
pub async fn update<E: Serialize>(
    controller: &Controller,
    kind: EntityKind,
    id: u64,
    entity: &E,
    assignments: Vec<(&'static FieldDescriptor, String)>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form = EditForm::open(kind, id, entity);

    if assignments.is_empty() {
        if !global.quiet {
            eprintln!("{} #{id}", form.title());
        }
        for field in form.fields() {
            let current = form.field_text(field.name);
            let value = util::prompt_text(field.label, Some(&current))?;
            form.set_field(field.name, &value)?;
        }
    } else {
        for (field, value) in assignments {
            form.set_field(field.name, &value)?;
        }
    }

    let Some(cmd) = form.begin_submit() else {
        return Ok(());
    };
    let result = controller.execute(cmd).await;
    form.finish();
    result?;

    output::success(&format!("{} updated", kind.title_label()), global);
    Ok(())
}

// ── Delete ──────────────────────────────────────────────────────────

/// Confirm, then delete one entity. Declining sends nothing.
pub async fn delete(
    controller: &Controller,
    kind: EntityKind,
    id: u64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(&delete_prompt(kind), global.yes)? {
        return Ok(());
    }
    controller.execute(Command::Delete { kind, id }).await?;
    output::success(&format!("{} deleted", kind.title_label()), global);
    Ok(())
}
