//! Loan command handlers.

use tabled::Tabled;

use shelfdesk_core::{Controller, Loan};

use crate::cli::{GlobalOpts, LoansArgs, LoansCommand};
use crate::error::CliError;
use crate::output;

pub const EMPTY: &str = "No borrowed books.";
pub const NOT_RETURNED: &str = "Not Returned";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct LoanRow {
    #[tabled(rename = "Loan ID")]
    id: u64,
    #[tabled(rename = "Book")]
    book: String,
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Borrowed")]
    borrowed: String,
    #[tabled(rename = "Returned")]
    returned: String,
}

impl From<&Loan> for LoanRow {
    fn from(l: &Loan) -> Self {
        Self {
            id: l.id,
            book: format!("{} (ID: {})", l.book.title, l.book.id),
            member: format!("{} (ID: {})", l.member.name, l.member.id),
            borrowed: l.borrowed_at.format(DATE_FORMAT).to_string(),
            returned: l.returned_at.map_or_else(
                || NOT_RETURNED.to_owned(),
                |at| at.format(DATE_FORMAT).to_string(),
            ),
        }
    }
}

pub fn render(global: &GlobalOpts, loans: &[Loan]) -> Result<String, CliError> {
    Ok(output::render_list(
        global.output_format(),
        loans,
        EMPTY,
        |l| LoanRow::from(l),
        |l| l.id.to_string(),
    )?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LoansArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LoansCommand::List => {
            let loans = controller.list_loans().await?;
            output::print_output(&render(global, &loans)?, global.quiet);
            Ok(())
        }
    }
}
