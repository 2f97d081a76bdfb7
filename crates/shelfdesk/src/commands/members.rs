//! Member command handlers.

use tabled::Tabled;

use shelfdesk_core::{Controller, EntityKind, Member};

use crate::cli::{GlobalOpts, MembersArgs, MembersCommand};
use crate::error::CliError;
use crate::output;

use super::{entity, util};

pub const EMPTY: &str = "No members found.";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct MemberRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Mobile")]
    mobile: String,
}

impl From<&Member> for MemberRow {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            email: m.email.clone(),
            mobile: m.mobile.clone(),
        }
    }
}

pub fn render(global: &GlobalOpts, members: &[Member]) -> Result<String, CliError> {
    Ok(output::render_list(
        global.output_format(),
        members,
        EMPTY,
        |m| MemberRow::from(m),
        |m| m.id.to_string(),
    )?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: MembersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MembersCommand::List => {
            let members = controller.list_members().await?;
            output::print_output(&render(global, &members)?, global.quiet);
            Ok(())
        }

        MembersCommand::Add {
            name,
            email,
            mobile,
        } => {
            entity::add(
                controller,
                EntityKind::Member,
                &[("name", name), ("email", email), ("mobile", mobile)],
                global,
            )
            .await
        }

        MembersCommand::Update(update) => {
            let assignments = util::parse_assignments(EntityKind::Member, &update.set)?;
            let members = controller.list_members().await?;
            let member = members
                .iter()
                .find(|m| m.id == update.id)
                .ok_or_else(|| util::not_found(EntityKind::Member, update.id))?;
            entity::update(
                controller,
                EntityKind::Member,
                update.id,
                member,
                assignments,
                global,
            )
            .await
        }

        MembersCommand::Delete { id } => {
            entity::delete(controller, EntityKind::Member, id, global).await
        }
    }
}
