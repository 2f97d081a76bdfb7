// Async HTTP client for the library REST API.
//
// Collections live at trailing-slash paths (`/books/`, `/members/`); single
// entities at `/{endpoint}/{id}`. Errors carry a `detail` field.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ErrorDetail;
use crate::models::{Book, Listing, Loan, Member, NewBook, NewLoan, NewMember};
use crate::{Error, TransportConfig};

/// Where the library API listens when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const BOOKS: Listing<Book> = Listing::new("books");
const MEMBERS: Listing<Member> = Listing::new("members");
const LOANS: Listing<Loan> = Listing::new("loans");

/// Longest body excerpt kept in deserialization error messages.
const PREVIEW_CHARS: usize = 200;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the library API.
///
/// Holds no state beyond the connection pool; every call is independent.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LibraryClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own connection pool.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends in `/` so relative joins append rather
    /// than replace the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Decode a 2xx body as JSON. An empty body decodes to `Value::Null`.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = ErrorDetail::from_body(&raw);
        if message.is_none() && !raw.is_empty() {
            debug!(
                status = status.as_u16(),
                "error body without detail: {}",
                preview(&raw)
            );
        }

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        listing: &Listing<T>,
    ) -> Result<Vec<T>, Error> {
        let value = self.get(path).await?;
        let body = value.to_string();
        listing.parse(value).map_err(|e| Error::Deserialization {
            message: format!(
                "{e} (field `{}`, body preview: {:?})",
                listing.field(),
                preview(&body)
            ),
            body,
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Public API
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Books ────────────────────────────────────────────────────────

    /// `GET /books/`
    pub async fn list_books(&self) -> Result<Vec<Book>, Error> {
        self.get_list("books/", &BOOKS).await
    }

    /// `POST /books/`
    pub async fn create_book(&self, book: &NewBook) -> Result<Value, Error> {
        self.post("books/", book).await
    }

    // ── Members ──────────────────────────────────────────────────────

    /// `GET /members/`
    pub async fn list_members(&self) -> Result<Vec<Member>, Error> {
        self.get_list("members/", &MEMBERS).await
    }

    /// `POST /members/`
    pub async fn create_member(&self, member: &NewMember) -> Result<Value, Error> {
        self.post("members/", member).await
    }

    // ── Loans ────────────────────────────────────────────────────────

    /// `GET /books/borrowed`
    pub async fn list_loans(&self) -> Result<Vec<Loan>, Error> {
        self.get_list("books/borrowed", &LOANS).await
    }

    /// `POST /loans/`
    pub async fn create_loan(&self, loan: &NewLoan) -> Result<Value, Error> {
        self.post("loans/", loan).await
    }

    // ── Generic entity mutation ──────────────────────────────────────

    /// `PATCH /{endpoint}/{id}` with a partial body.
    pub async fn update_entity<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        id: u64,
        body: &B,
    ) -> Result<Value, Error> {
        self.patch(&format!("{endpoint}/{id}"), body).await
    }

    /// `DELETE /{endpoint}/{id}`
    pub async fn delete_entity(&self, endpoint: &str, id: u64) -> Result<Value, Error> {
        self.delete(&format!("{endpoint}/{id}")).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn preview(body: &str) -> &str {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
