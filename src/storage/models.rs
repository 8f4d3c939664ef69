use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reading status of a book. Serialized with the display names the API
/// contract uses ("To Read", "Reading", "Completed").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    #[default]
    #[serde(rename = "To Read")]
    ToRead,
    Reading,
    Completed,
}

/// Error returned when a caller supplies a status outside the allowed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid status value: {}", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for BookStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "To Read" => Ok(BookStatus::ToRead),
            "Reading" => Ok(BookStatus::Reading),
            "Completed" => Ok(BookStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookStatus::ToRead => "To Read",
            BookStatus::Reading => "Reading",
            BookStatus::Completed => "Completed",
        };
        f.write_str(name)
    }
}

/// A book record stored in redb.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub status: BookStatus,
    /// Served path ("/uploads/...") or a caller-supplied URL.
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// A free-text note attached to a book. `book_id` is caller-supplied and is
/// not checked against existing books; deleting a book leaves its notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    pub book_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
