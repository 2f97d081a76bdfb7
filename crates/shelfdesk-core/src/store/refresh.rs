// ── Bulk refresh operations ──
//
// Whole-dashboard writes applied after the three list fetches settle.

use chrono::Utc;
use tracing::debug;

use shelfdesk_api::{Book, Loan, Member};

use super::DataStore;

impl DataStore {
    /// Replace all three collections from a successful fetch.
    pub(crate) fn apply_snapshot(&self, books: Vec<Book>, members: Vec<Member>, loans: Vec<Loan>) {
        self.books.replace(books);
        self.members.replace(members);
        self.loans.replace(loans);
        self.last_refresh.send_replace(Some(Utc::now()));
        self.loading.send_replace(false);

        debug!(
            books = self.book_count(),
            members = self.member_count(),
            loans = self.loan_count(),
            "dashboard snapshot applied"
        );
    }

    /// Empty every collection after a failed fetch.
    pub(crate) fn clear_all(&self) {
        self.books.clear();
        self.members.clear();
        self.loans.clear();
        self.loading.send_replace(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: u64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            author: "Anon".into(),
            copies: None,
        }
    }

    fn member(id: u64) -> Member {
        Member {
            id,
            name: format!("Member {id}"),
            email: String::new(),
            mobile: String::new(),
        }
    }

    #[test]
    fn apply_snapshot_stops_loading() {
        let store = DataStore::new();
        assert!(store.is_loading());
        assert!(store.last_refresh().is_none());

        store.apply_snapshot(vec![book(1), book(2)], vec![member(4)], Vec::new());

        assert!(!store.is_loading());
        assert!(store.last_refresh().is_some());
        assert_eq!(store.book_count(), 2);
        assert_eq!(store.member_by_id(4).map(|m| m.name.clone()).as_deref(), Some("Member 4"));
        assert!(store.book_by_id(3).is_none());
    }

    #[test]
    fn clear_all_empties_everything() {
        let store = DataStore::new();
        store.apply_snapshot(vec![book(1)], vec![member(1)], Vec::new());

        store.clear_all();

        assert!(!store.is_loading());
        assert_eq!(store.book_count(), 0);
        assert_eq!(store.member_count(), 0);
        assert_eq!(store.loan_count(), 0);
    }
}
