//! Response and request types for the library REST API.
//!
//! The server is loose about envelopes: list endpoints return either a bare
//! JSON array or an object carrying the array under a named field. See
//! [`Listing`].

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Books ────────────────────────────────────────────────────────────

/// A catalogue entry — from `GET /books/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Number of copies held. Older servers omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<u32>,
}

/// Request body for `POST /books/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
}

// ── Members ──────────────────────────────────────────────────────────

/// A registered borrower — from `GET /members/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
}

/// Request body for `POST /members/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub mobile: String,
}

// ── Loans ────────────────────────────────────────────────────────────

/// Book snapshot embedded in a loan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanBook {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// Member snapshot embedded in a loan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanMember {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
}

/// A borrowing record — from `GET /books/borrowed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u64,
    pub book: LoanBook,
    pub member: LoanMember,
    #[serde(with = "timestamp")]
    pub borrowed_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }
}

/// Request body for `POST /loans/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    pub book_id: u64,
    pub member_id: u64,
}

// ── Listing envelope ─────────────────────────────────────────────────

/// List response envelope: a bare array, or an object holding the array
/// under `field`. A missing or `null` field is an empty list.
#[derive(Debug)]
pub struct Listing<T> {
    field: &'static str,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> Listing<T> {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Extract the items from a decoded response body.
    pub fn parse(&self, value: Value) -> Result<Vec<T>, serde_json::Error> {
        match value {
            Value::Array(_) => serde_json::from_value(value),
            Value::Object(mut map) => match map.remove(self.field) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(items) => serde_json::from_value(items),
            },
            other => Err(serde::de::Error::custom(format!(
                "expected an array or an object with `{}`, got {}",
                self.field,
                kind_of(&other)
            ))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Timestamps ───────────────────────────────────────────────────────

/// Timestamps arrive as RFC 3339, or as naive ISO-8601 which is taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_some(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_accepts_bare_array_and_envelope() {
        let listing = Listing::<Book>::new("books");

        let bare = json!([{ "id": 1, "title": "Dune", "author": "Herbert" }]);
        assert_eq!(listing.parse(bare).unwrap().len(), 1);

        let wrapped = json!({ "books": [
            { "id": 1, "title": "Dune", "author": "Herbert", "copies": 3 },
            { "id": 2, "title": "Emma", "author": "Austen" },
        ]});
        let books = listing.parse(wrapped).unwrap();
        assert_eq!(books[0].copies, Some(3));
        assert_eq!(books[1].copies, None);
    }

    #[test]
    fn listing_without_field_is_empty() {
        let listing = Listing::<Member>::new("members");
        assert!(listing.parse(json!({ "total": 0 })).unwrap().is_empty());
        assert!(listing.parse(json!({ "members": null })).unwrap().is_empty());
    }

    #[test]
    fn listing_rejects_scalars() {
        let listing = Listing::<Member>::new("members");
        let err = listing.parse(json!("nope")).unwrap_err();
        assert!(err.to_string().contains("members"));
    }

    #[test]
    fn loan_timestamps_accept_naive_and_rfc3339() {
        let loan: Loan = serde_json::from_value(json!({
            "id": 9,
            "book": { "id": 1, "title": "Dune", "author": "Herbert" },
            "member": { "id": 4, "name": "Ada", "email": "ada@example.org", "mobile": "555" },
            "borrowed_at": "2024-03-01T10:15:30.123456",
            "returned_at": "2024-03-08T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(loan.borrowed_at.to_rfc3339(), "2024-03-01T10:15:30.123456+00:00");
        assert!(loan.is_returned());

        let open: Loan = serde_json::from_value(json!({
            "id": 10,
            "book": { "id": 1 },
            "member": { "id": 4 },
            "borrowed_at": "2024-03-01",
            "returned_at": null
        }))
        .unwrap();
        assert!(!open.is_returned());
        assert_eq!(open.book.title, "");
    }
}
