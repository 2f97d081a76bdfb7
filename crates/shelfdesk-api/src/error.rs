use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Top-level error type for the `shelfdesk-api` crate.
///
/// `shelfdesk-core` maps these into user-facing messages; the `Api`
/// variant already carries the normalized `detail` text when the server
/// sent one.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying `reqwest::Client` could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    // ── Server responses ────────────────────────────────────────────
    /// Non-2xx response. `message` is the normalized `detail` field, if any.
    #[error("API error (HTTP {status}): {}", .message.as_deref().unwrap_or("no detail"))]
    Api { status: u16, message: Option<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The normalized server message, when the server explained itself.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// ── `detail` normalization ──────────────────────────────────────────

/// Error body shape: `{"detail": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

/// One entry of a validation-error array.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailItem {
    #[serde(default)]
    pub msg: Option<String>,
}

/// The `detail` field of an error response.
///
/// Validation failures arrive as an array of `{msg, ...}` objects, other
/// rejections as a plain string. Anything else is kept verbatim.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Items(Vec<DetailItem>),
    Other(Value),
}

impl ErrorDetail {
    /// Collapse the detail into a single display string.
    ///
    /// Arrays join their `msg` entries with ", ", strings pass through, and
    /// other JSON values render as compact JSON. Returns `None` when there
    /// is nothing worth showing.
    pub fn message(&self) -> Option<String> {
        let text = match self {
            Self::Message(s) => s.clone(),
            Self::Items(items) => items
                .iter()
                .filter_map(|item| item.msg.as_deref())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Other(Value::Null) => return None,
            Self::Other(v) => v.to_string(),
        };
        if text.is_empty() { None } else { Some(text) }
    }

    /// Parse a raw response body and normalize its `detail`, if present.
    pub fn from_body(raw: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|body| body.detail)
            .and_then(|detail| detail.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_detail_joins_messages() {
        let raw = r#"{"detail":[{"loc":["body","title"],"msg":"title required"},{"msg":"author required"}]}"#;
        assert_eq!(
            ErrorDetail::from_body(raw).as_deref(),
            Some("title required, author required")
        );
    }

    #[test]
    fn string_detail_passes_through() {
        let raw = r#"{"detail":"Book not available"}"#;
        assert_eq!(ErrorDetail::from_body(raw).as_deref(), Some("Book not available"));
    }

    #[test]
    fn object_detail_renders_as_json() {
        let raw = r#"{"detail":{"code":7}}"#;
        assert_eq!(ErrorDetail::from_body(raw).as_deref(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn missing_or_null_detail_yields_none() {
        assert_eq!(ErrorDetail::from_body(r#"{"error":"x"}"#), None);
        assert_eq!(ErrorDetail::from_body(r#"{"detail":null}"#), None);
        assert_eq!(ErrorDetail::from_body("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn api_error_display_falls_back_without_detail() {
        let err = Error::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): no detail");
        assert!(err.detail().is_none());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_and_transient_classification() {
        let missing = Error::Api {
            status: 404,
            message: Some("Book not found".into()),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());

        let gateway = Error::Api {
            status: 503,
            message: None,
        };
        assert!(gateway.is_transient());
    }
}
