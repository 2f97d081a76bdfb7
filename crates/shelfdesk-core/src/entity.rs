// ── Editable entity kinds ──
//
// Books and members share one create/edit/delete flow, parameterized by
// the endpoint they live at and the fields a user may touch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Form contents keyed by field name, in display order.
pub type FormData = IndexMap<String, Value>;

/// An entity kind that can be created, edited and deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Book,
    Member,
}

impl EntityKind {
    /// Collection path segment on the API (`/books/5`).
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::Member => "members",
        }
    }

    /// Lowercase noun used in prompts ("delete this book?").
    pub fn label(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Member => "member",
        }
    }

    /// Capitalized noun ("Book updated").
    pub fn title_label(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Member => "Member",
        }
    }

    pub fn edit_title(self) -> &'static str {
        match self {
            Self::Book => "Edit Book",
            Self::Member => "Edit Member",
        }
    }

    pub fn create_title(self) -> &'static str {
        match self {
            Self::Book => "Add Book",
            Self::Member => "Add Member",
        }
    }

    /// Fields offered by the generic edit dialog.
    pub fn edit_fields(self) -> &'static [FieldDescriptor] {
        match self {
            Self::Book => BOOK_EDIT_FIELDS,
            Self::Member => MEMBER_FIELDS,
        }
    }

    /// Fields offered by the create dialog.
    pub fn create_fields(self) -> &'static [FieldDescriptor] {
        match self {
            Self::Book => BOOK_CREATE_FIELDS,
            Self::Member => MEMBER_FIELDS,
        }
    }

    /// Look up an editable field by name.
    pub fn edit_field(self, name: &str) -> Option<&'static FieldDescriptor> {
        self.edit_fields().iter().find(|f| f.name == name)
    }
}

// ── Field descriptors ────────────────────────────────────────────────

/// How a form input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
}

impl InputKind {
    /// Convert raw input text into the JSON value sent to the API.
    ///
    /// Number inputs treat empty text as `0`; anything that is neither an
    /// integer nor a float is rejected.
    pub fn coerce(self, raw: &str) -> Result<Value, CoreError> {
        match self {
            Self::Text => Ok(Value::String(raw.to_owned())),
            Self::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Value::from(0));
                }
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(Value::from(n));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| CoreError::validation(format!("'{raw}' is not a number")))
            }
        }
    }
}

/// One input of a create or edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// JSON key sent to the API.
    pub name: &'static str,
    /// Human label.
    pub label: &'static str,
    pub input: InputKind,
}

impl FieldDescriptor {
    const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            input: InputKind::Text,
        }
    }

    const fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            input: InputKind::Number,
        }
    }

    /// Render a stored JSON value back into editable text.
    pub fn display_value(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

const BOOK_EDIT_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("title", "Title"),
    FieldDescriptor::text("author", "Author"),
    FieldDescriptor::number("copies", "Copies"),
];

const BOOK_CREATE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("title", "Title"),
    FieldDescriptor::text("author", "Author"),
];

const MEMBER_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text("name", "Name"),
    FieldDescriptor::text("email", "Email"),
    FieldDescriptor::text("mobile", "Mobile"),
];
