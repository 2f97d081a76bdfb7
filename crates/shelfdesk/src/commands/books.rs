//! Book command handlers.

use tabled::Tabled;

use shelfdesk_core::actions::{self, BORROW_PROMPT, BORROW_SUCCESS};
use shelfdesk_core::{Book, Command as CoreCommand, Controller, EntityKind};

use crate::cli::{BooksArgs, BooksCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{entity, util};

pub const EMPTY: &str = "No books found.";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct BookRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Copies")]
    copies: String,
}

impl From<&Book> for BookRow {
    fn from(b: &Book) -> Self {
        Self {
            id: b.id,
            title: b.title.clone(),
            author: b.author.clone(),
            copies: b.copies.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

pub fn render(global: &GlobalOpts, books: &[Book]) -> Result<String, CliError> {
    Ok(output::render_list(
        global.output_format(),
        books,
        EMPTY,
        |b| BookRow::from(b),
        |b| b.id.to_string(),
    )?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: BooksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BooksCommand::List => {
            let books = controller.list_books().await?;
            output::print_output(&render(global, &books)?, global.quiet);
            Ok(())
        }

        BooksCommand::Add { title, author } => {
            entity::add(
                controller,
                EntityKind::Book,
                &[("title", title), ("author", author)],
                global,
            )
            .await
        }

        BooksCommand::Update(update) => {
            let assignments = util::parse_assignments(EntityKind::Book, &update.set)?;
            let books = controller.list_books().await?;
            let book = books
                .iter()
                .find(|b| b.id == update.id)
                .ok_or_else(|| util::not_found(EntityKind::Book, update.id))?;
            entity::update(
                controller,
                EntityKind::Book,
                update.id,
                book,
                assignments,
                global,
            )
            .await
        }

        BooksCommand::Delete { id } => {
            entity::delete(controller, EntityKind::Book, id, global).await
        }

        BooksCommand::Borrow { id, member } => {
            let answer = match member {
                Some(member) => member,
                None => util::prompt_text(BORROW_PROMPT, None)?,
            };
            let Some(member_id) = actions::parse_member_id(&answer)? else {
                return Ok(());
            };

            controller
                .execute(CoreCommand::Borrow {
                    book_id: id,
                    member_id,
                })
                .await?;
            output::success(BORROW_SUCCESS, global);
            Ok(())
        }
    }
}
