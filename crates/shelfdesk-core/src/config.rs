// ── Runtime client configuration ──
//
// Describes *where* the library API lives and how patiently to talk to it.
// Never touches disk: the CLI/TUI builds a `ClientConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Request timeout used unless a profile overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for a [`Controller`](crate::Controller).
///
/// There is no `Default`: callers always supply the base URL, usually
/// parsed from a profile by `shelfdesk-config`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the library API, e.g. `http://localhost:8000`.
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Background refresh interval. 0 disables periodic refresh.
    pub refresh_interval_secs: u64,
    /// Reload the dashboard after each successful command. Off for
    /// one-shot callers that never read the store.
    pub reload_after_mutation: bool,
}

impl ClientConfig {
    pub fn with_url(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
            refresh_interval_secs: 0,
            reload_after_mutation: true,
        }
    }
}
