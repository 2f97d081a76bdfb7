// ── Central reactive data store ──
//
// Books, members and loans as immutable snapshots. Every successful
// mutation is followed by a reload of all three; nothing is patched in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use shelfdesk_api::{Book, Loan, Member};

use super::collection::EntityCollection;
use crate::stream::EntityStream;

/// Central reactive store for the dashboard collections.
pub struct DataStore {
    pub(crate) books: EntityCollection<Book>,
    pub(crate) members: EntityCollection<Member>,
    pub(crate) loans: EntityCollection<Loan>,
    /// `true` until the first refresh settles.
    pub(crate) loading: watch::Sender<bool>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    pub fn new() -> Self {
        let (loading, _) = watch::channel(true);
        let (last_refresh, _) = watch::channel(None);

        Self {
            books: EntityCollection::new(),
            members: EntityCollection::new(),
            loans: EntityCollection::new(),
            loading,
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn books_snapshot(&self) -> Arc<Vec<Arc<Book>>> {
        self.books.snapshot()
    }

    pub fn members_snapshot(&self) -> Arc<Vec<Arc<Member>>> {
        self.members.snapshot()
    }

    pub fn loans_snapshot(&self) -> Arc<Vec<Arc<Loan>>> {
        self.loans.snapshot()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn book_by_id(&self, id: u64) -> Option<Arc<Book>> {
        self.books.snapshot().iter().find(|b| b.id == id).cloned()
    }

    pub fn member_by_id(&self, id: u64) -> Option<Arc<Member>> {
        self.members.snapshot().iter().find(|m| m.id == id).cloned()
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_books(&self) -> EntityStream<Book> {
        EntityStream::new(self.books.subscribe())
    }

    pub fn subscribe_members(&self) -> EntityStream<Member> {
        EntityStream::new(self.members.subscribe())
    }

    pub fn subscribe_loans(&self) -> EntityStream<Loan> {
        EntityStream::new(self.loans.subscribe())
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}
