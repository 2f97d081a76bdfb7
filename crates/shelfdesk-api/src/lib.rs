// shelfdesk-api: Async Rust client for the library REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, LibraryClient};
pub use error::{Error, ErrorDetail};
pub use models::{
    Book, Listing, Loan, LoanBook, LoanMember, Member, NewBook, NewLoan, NewMember,
};
pub use transport::TransportConfig;
