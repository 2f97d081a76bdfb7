// shelfdesk-core: Reactive data layer between shelfdesk-api and consumers (CLI/TUI).

pub mod actions;
pub mod command;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod form;
pub mod prompt;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use actions::ActionOutcome;
pub use command::{Command, CommandResult};
pub use config::ClientConfig;
pub use controller::Controller;
pub use entity::{EntityKind, FieldDescriptor, FormData, InputKind};
pub use error::CoreError;
pub use form::{DialogState, EditForm, EntityForm};
pub use prompt::{Answers, Prompter};
pub use store::DataStore;
pub use stream::{EntityStream, EntityWatchStream};

// Re-export API model types for consumers.
pub use shelfdesk_api::{Book, Loan, LoanBook, LoanMember, Member, NewBook, NewMember};
