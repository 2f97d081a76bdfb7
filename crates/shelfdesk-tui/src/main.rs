//! `shelfdesk-tui` -- terminal dashboard for a library-management service.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `shelfdesk-core`'s [`EntityStream`](shelfdesk_core::EntityStream). One
//! screen shows books, members and borrowed books; create, edit, borrow
//! and delete run as modal dialogs over it.
//!
//! Logs are written to a file (default `/tmp/shelfdesk-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shelfdesk_config::{load_config_or_default, parse_api_url, resolve_client_config};
use shelfdesk_core::{ClientConfig, Controller};

use crate::app::App;

/// Terminal dashboard for a library's books, members and loans.
#[derive(Parser, Debug)]
#[command(name = "shelfdesk-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "SHELFDESK_PROFILE")]
    profile: Option<String>,

    /// Library API base URL (overrides profile)
    #[arg(short = 'u', long, env = "SHELFDESK_API_URL")]
    api_url: Option<String>,

    /// Background refresh interval in seconds (0 disables)
    #[arg(long)]
    refresh: Option<u64>,

    /// Log file path (defaults to /tmp/shelfdesk-tui.log)
    #[arg(long, default_value = "/tmp/shelfdesk-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Logging to stdout/stderr would corrupt the
/// TUI. The returned guard must live until exit so logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "shelfdesk_tui={log_level},shelfdesk_core={log_level},shelfdesk_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("shelfdesk-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the API endpoint. Priority: CLI flags > config profile > built-in
/// local default.
fn build_client_config(cli: &Cli) -> Result<ClientConfig> {
    let cfg = load_config_or_default();
    let mut client = resolve_client_config(&cfg, cli.profile.as_deref())?;

    if let Some(ref raw) = cli.api_url {
        client.url = parse_api_url(raw)?;
    }
    if let Some(secs) = cli.refresh {
        client.refresh_interval_secs = secs;
    }
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in BEFORE entering the terminal
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_client_config(&cli)?;
    info!(url = %config.url, "starting shelfdesk-tui");

    let controller = Controller::new(config)?;
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}
