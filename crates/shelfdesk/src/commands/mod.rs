//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod books;
pub mod config_cmd;
pub mod dashboard;
pub mod entity;
pub mod loans;
pub mod members;
pub mod util;

use shelfdesk_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Books(args) => books::handle(controller, args, global).await,
        Command::Members(args) => members::handle(controller, args, global).await,
        Command::Loans(args) => loans::handle(controller, args, global).await,
        Command::Dashboard => dashboard::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not need the library API".into(),
        }),
    }
}
