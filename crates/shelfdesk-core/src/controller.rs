// ── Controller abstraction ──
//
// Lifecycle management for a library API session: the initial dashboard
// load, optional background refresh, command routing, and reactive data
// streaming through the DataStore.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shelfdesk_api::{Book, LibraryClient, Loan, Member, NewLoan, TransportConfig};

use crate::command::{Command, CommandResult};
use crate::config::ClientConfig;
use crate::error::{CoreError, GENERIC_FAILURE};
use crate::store::DataStore;
use crate::stream::EntityStream;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the HTTP client and
/// the DataStore; a successful command reloads all three collections unless
/// the config turns that off.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ClientConfig,
    client: LibraryClient,
    store: Arc<DataStore>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Performs no I/O;
    /// call [`start()`](Self::start) to load the dashboard.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = LibraryClient::new(config.url.as_str(), &transport)
            .map_err(|e| CoreError::from_api(e, GENERIC_FAILURE, config.timeout))?;
        Ok(Self::with_client(config, client))
    }

    /// Create a Controller around an existing client.
    pub fn with_client(config: ClientConfig, client: LibraryClient) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                store: Arc::new(DataStore::new()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Access the underlying API client.
    pub fn client(&self) -> &LibraryClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load the dashboard and spawn the periodic refresh task if one
    /// is configured.
    pub async fn start(&self) {
        self.refresh().await;

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        info!(url = %self.inner.config.url, "dashboard started");
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }

    /// Fetch books, members and loans concurrently and replace the store.
    ///
    /// A failure in any fetch discards all three results and leaves every
    /// collection empty. Loading is cleared either way; errors are only
    /// logged.
    pub async fn refresh(&self) {
        let client = &self.inner.client;
        let (books, members, loans) =
            tokio::join!(client.list_books(), client.list_members(), client.list_loans());

        match (books, members, loans) {
            (Ok(books), Ok(members), Ok(loans)) => {
                self.inner.store.apply_snapshot(books, members, loans);
            }
            (books, members, loans) => {
                for err in [books.err(), members.err(), loans.err()].into_iter().flatten() {
                    warn!(error = %err, "dashboard fetch failed");
                }
                self.inner.store.clear_all();
            }
        }
    }

    // ── Direct reads ─────────────────────────────────────────────

    /// Fetch books without touching the store.
    pub async fn list_books(&self) -> Result<Vec<Book>, CoreError> {
        self.inner
            .client
            .list_books()
            .await
            .map_err(|e| self.api_error(e, GENERIC_FAILURE))
    }

    /// Fetch members without touching the store.
    pub async fn list_members(&self) -> Result<Vec<Member>, CoreError> {
        self.inner
            .client
            .list_members()
            .await
            .map_err(|e| self.api_error(e, GENERIC_FAILURE))
    }

    /// Fetch borrowed-book records without touching the store.
    pub async fn list_loans(&self) -> Result<Vec<Loan>, CoreError> {
        self.inner
            .client
            .list_loans()
            .await
            .map_err(|e| self.api_error(e, GENERIC_FAILURE))
    }

    fn api_error(&self, err: shelfdesk_api::Error, fallback: &str) -> CoreError {
        CoreError::from_api(err, fallback, self.inner.config.timeout)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command. A success reloads the dashboard unless
    /// `reload_after_mutation` is off; a failure leaves the store untouched.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let fallback = cmd.fallback_message();
        let result = route_command(&self.inner.client, cmd)
            .await
            .map_err(|e| self.api_error(e, &fallback))?;

        if self.inner.config.reload_after_mutation {
            self.refresh().await;
        }
        Ok(result)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: build, run closure, shut down.
    ///
    /// For the CLI: no initial load, no periodic refresh and no reload
    /// after commands, since each invocation performs one request-response
    /// cycle.
    pub async fn oneshot<F, Fut, T>(config: ClientConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;
        cfg.reload_after_mutation = false;

        let controller = Controller::new(cfg)?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn books_snapshot(&self) -> Arc<Vec<Arc<Book>>> {
        self.inner.store.books_snapshot()
    }

    pub fn members_snapshot(&self) -> Arc<Vec<Arc<Member>>> {
        self.inner.store.members_snapshot()
    }

    pub fn loans_snapshot(&self) -> Arc<Vec<Arc<Loan>>> {
        self.inner.store.loans_snapshot()
    }

    // ── Stream accessors ─────────────────────────────────────────

    pub fn books(&self) -> EntityStream<Book> {
        self.inner.store.subscribe_books()
    }

    pub fn members(&self) -> EntityStream<Member> {
        self.inner.store.subscribe_members()
    }

    pub fn loans(&self) -> EntityStream<Loan> {
        self.inner.store.subscribe_loans()
    }

    // ── Status ───────────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.inner.store.is_loading()
    }

    /// Subscribe to the loading flag (true until the first refresh settles).
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.store.subscribe_loading()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.store.last_refresh()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically reload the dashboard.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => controller.refresh().await,
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(
    client: &LibraryClient,
    cmd: Command,
) -> Result<CommandResult, shelfdesk_api::Error> {
    match cmd {
        Command::CreateBook(book) => {
            debug!(title = %book.title, "creating book");
            client.create_book(&book).await.map(CommandResult::Created)
        }
        Command::CreateMember(member) => {
            debug!(name = %member.name, "creating member");
            client.create_member(&member).await.map(CommandResult::Created)
        }
        Command::Borrow { book_id, member_id } => {
            debug!(book_id, member_id, "borrowing book");
            client
                .create_loan(&NewLoan { book_id, member_id })
                .await
                .map(CommandResult::Created)
        }
        Command::Update { kind, id, data } => {
            debug!(%kind, id, fields = data.len(), "updating entity");
            client
                .update_entity(kind.endpoint(), id, &data)
                .await
                .map(CommandResult::Updated)
        }
        Command::Delete { kind, id } => {
            debug!(%kind, id, "deleting entity");
            client.delete_entity(kind.endpoint(), id).await?;
            Ok(CommandResult::Ok)
        }
    }
}
