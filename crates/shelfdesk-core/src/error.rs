// ── Core error types ──
//
// User-facing errors from shelfdesk-core. Consumers never see raw HTTP
// bodies: a rejected request carries the server's normalized `detail`
// text, or a caller-chosen fallback when the server gave none.

use std::time::Duration;

use thiserror::Error;

/// Message shown when the server rejects a request without explanation.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach library API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Library API timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{message}")]
    Validation { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Translate an API error, using `fallback` when a rejection carried
    /// no `detail`. `timeout` is the limit the request ran under.
    pub fn from_api(err: shelfdesk_api::Error, fallback: &str, timeout: Duration) -> Self {
        match err {
            shelfdesk_api::Error::Api { status, message } => CoreError::Rejected {
                status,
                message: message.unwrap_or_else(|| fallback.to_owned()),
            },
            shelfdesk_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Internal(e.to_string())
                }
            }
            shelfdesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            shelfdesk_api::Error::Build(message) => CoreError::Config { message },
            shelfdesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(30);

    #[test]
    fn rejection_keeps_server_detail() {
        let err = CoreError::from_api(
            shelfdesk_api::Error::Api {
                status: 422,
                message: Some("title required".into()),
            },
            GENERIC_FAILURE,
            LIMIT,
        );
        assert_eq!(err.to_string(), "title required");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn rejection_without_detail_uses_fallback() {
        let err = CoreError::from_api(
            shelfdesk_api::Error::Api {
                status: 500,
                message: None,
            },
            GENERIC_FAILURE,
            LIMIT,
        );
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let err = CoreError::from_api(
            shelfdesk_api::Error::Api {
                status: 404,
                message: None,
            },
            "Failed to delete book",
            LIMIT,
        );
        assert_eq!(err.to_string(), "Failed to delete book");
        assert!(err.is_not_found());
    }
}
