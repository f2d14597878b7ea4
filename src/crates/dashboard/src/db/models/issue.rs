//! Issue model for database persistence

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A GitHub issue tracked by the dashboard, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    /// Row identifier (autoincrement)
    pub id: i64,

    /// GitHub login of the issue author
    pub creator: String,

    /// Issue title
    pub title: String,

    /// Issue body
    pub description: Option<String>,

    /// Classified DBMS (one of the supported list, or "N/A")
    pub dbms: Option<String>,

    /// Classified test oracle (or "N/A")
    pub oracle: Option<String>,

    /// Review status: Open, Fixed, Closed, Not a bug
    pub status: String,

    /// Canonical issue URL; unique per row
    pub html_url: String,

    /// Issue creation timestamp (RFC 3339 string)
    pub created_at: String,

    /// Issue last-update timestamp (RFC 3339 string)
    pub updated_at: String,
}

/// A classified issue that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub creator: String,
    pub title: String,
    pub description: Option<String>,
    pub dbms: String,
    pub oracle: String,
    pub status: String,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
}
