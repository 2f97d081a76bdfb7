// ── User prompts ──
//
// Borrow and delete need a blocking answer from the user. The CLI asks on
// the terminal; the TUI collects answers in overlays first and replays them.

use crate::error::CoreError;

/// Source of yes/no confirmations and free-text answers.
pub trait Prompter {
    /// Ask a yes/no question. `false` means the user declined.
    fn confirm(&self, message: &str) -> Result<bool, CoreError>;

    /// Ask for a line of text. `None` means the user dismissed the prompt.
    fn prompt(&self, message: &str) -> Result<Option<String>, CoreError>;
}

/// Answers collected ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub confirm: bool,
    pub input: Option<String>,
}

impl Answers {
    pub fn confirmed() -> Self {
        Self {
            confirm: true,
            input: None,
        }
    }

    pub fn declined() -> Self {
        Self::default()
    }

    pub fn input(text: impl Into<String>) -> Self {
        Self {
            confirm: true,
            input: Some(text.into()),
        }
    }
}

impl Prompter for Answers {
    fn confirm(&self, _message: &str) -> Result<bool, CoreError> {
        Ok(self.confirm)
    }

    fn prompt(&self, _message: &str) -> Result<Option<String>, CoreError> {
        Ok(self.input.clone())
    }
}
