//! Data bridge: connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: loads the dashboard, then forwards every
//! collection replacement and loading-flag change as an [`Action`]
//! through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use shelfdesk_core::Controller;

use crate::action::Action;

/// Load the dashboard and forward store changes until cancelled.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // Subscribe before the first load so its snapshots are not missed
    let mut books = controller.books();
    let mut members = controller.members();
    let mut loans = controller.loans();
    let mut loading = controller.loading();

    tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        () = controller.start() => {}
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(b) = books.changed() => {
                debug!(count = b.len(), "dispatching BooksUpdated");
                let _ = action_tx.send(Action::BooksUpdated(b));
            }
            Some(m) = members.changed() => {
                let _ = action_tx.send(Action::MembersUpdated(m));
            }
            Some(l) = loans.changed() => {
                let _ = action_tx.send(Action::LoansUpdated(l));
            }
            Ok(()) = loading.changed() => {
                let is_loading = *loading.borrow_and_update();
                let _ = action_tx.send(Action::LoadingChanged(is_loading));
            }
        }
    }

    controller.shutdown().await;
    debug!("data bridge shut down");
}
