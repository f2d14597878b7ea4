//! Bug report model for database persistence
//!
//! Rows are a one-time import of the upstream `sqlancer/bugs` bug list;
//! the upstream file is frozen, so rows are never re-synced afterwards.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An imported SQLancer bug report, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BugReport {
    /// Row identifier (autoincrement)
    pub id: i64,

    /// Bug title
    pub title: Option<String>,

    /// DBMS the bug was found in
    pub dbms: Option<String>,

    /// Test oracle that surfaced the bug
    pub oracle: Option<String>,

    /// Status: Open, Fixed, Closed, Not a bug
    pub status: String,

    /// Report date (RFC 3339 string)
    pub created_at: Option<String>,

    /// Reproducing test case
    pub test_case: Option<String>,

    /// Reported severity
    pub severity: Option<String>,

    /// Mailing list link, if any
    pub url_email: Option<String>,

    /// Bug tracker link, if any
    pub url_bugtracker: Option<String>,

    /// Fix commit/PR link, if any
    pub url_fix: Option<String>,

    /// Reporter name
    pub reporter: Option<String>,
}

/// A parsed bug list entry that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBugReport {
    pub title: Option<String>,
    pub dbms: Option<String>,
    pub oracle: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
    pub test_case: Option<String>,
    pub severity: Option<String>,
    pub url_email: Option<String>,
    pub url_bugtracker: Option<String>,
    pub url_fix: Option<String>,
    pub reporter: Option<String>,
}
