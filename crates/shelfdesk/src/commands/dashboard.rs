//! The combined dashboard view: books, members and borrowed books.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::warn;

use shelfdesk_core::{Book, Controller, Loan, Member};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::{books, loans, members};

const TITLE: &str = "Library Dashboard";
const LOADING: &str = "Loading dashboard...";

#[derive(Serialize)]
struct Dashboard {
    books: Vec<Book>,
    members: Vec<Member>,
    loans: Vec<Loan>,
}

fn spinner(global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet || global.output_format() != OutputFormat::Table {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(LOADING);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

fn heading(text: &str, global: &GlobalOpts) -> String {
    if output::should_color(global.color_mode()) {
        text.bold().to_string()
    } else {
        text.to_owned()
    }
}

fn render_table(dashboard: &Dashboard, global: &GlobalOpts) -> Result<String, CliError> {
    let sections = [
        ("Books", books::render(global, &dashboard.books)?),
        ("Members", members::render(global, &dashboard.members)?),
        ("Borrowed Books", loans::render(global, &dashboard.loans)?),
    ];

    let mut out = heading(TITLE, global);
    for (name, body) in sections {
        out.push_str("\n\n");
        out.push_str(&heading(name, global));
        out.push('\n');
        out.push_str(&body);
    }
    Ok(out)
}

/// A failed fetch is logged and leaves all three sections empty; the
/// dashboard itself never fails.
async fn fetch(controller: &Controller) -> Dashboard {
    let (books, members, loans) = tokio::join!(
        controller.list_books(),
        controller.list_members(),
        controller.list_loans()
    );
    match (books, members, loans) {
        (Ok(books), Ok(members), Ok(loans)) => Dashboard {
            books,
            members,
            loans,
        },
        (books, members, loans) => {
            for err in [books.err(), members.err(), loans.err()].into_iter().flatten() {
                warn!(error = %err, "dashboard fetch failed");
            }
            Dashboard {
                books: Vec::new(),
                members: Vec::new(),
                loans: Vec::new(),
            }
        }
    }
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let bar = spinner(global);
    let dashboard = fetch(controller).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let out = match global.output_format() {
        OutputFormat::Table => render_table(&dashboard, global)?,
        OutputFormat::Plain => [
            books::render(global, &dashboard.books)?,
            members::render(global, &dashboard.members)?,
            loans::render(global, &dashboard.loans)?,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n"),
        structured => output::render_structured(structured, &dashboard)?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
