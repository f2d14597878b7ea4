//! One-time import of the upstream SQLancer bug list.
//!
//! Loads `bugs.json` from the `sqlancer/bugs` GitHub repository. The file
//! was last touched in January 2024 and is declared frozen upstream, so the
//! import runs only when the table is empty and the rows are never
//! re-synced afterwards.

use crate::db::connection::DatabasePool;
use crate::db::models::NewBugReport;
use crate::db::repositories::BugReportRepository;
use crate::db::DatabaseError;
use crate::github::GitHubClient;
use crate::sync::SyncError;
use chrono::NaiveDate;
use serde::Deserialize;

const BUGS_OWNER: &str = "sqlancer";
const BUGS_REPO: &str = "bugs";
const BUGS_PATH: &str = "bugs.json";

/// A raw entry of `bugs.json`.
#[derive(Debug, Deserialize)]
struct BugEntry {
    title: Option<String>,
    dbms: Option<String>,
    oracle: Option<String>,
    status: Option<String>,
    /// "d/M/yyyy"
    date: Option<String>,
    #[serde(default)]
    test: Option<TestField>,
    severity: Option<String>,
    links: Option<BugLinks>,
    reporter: Option<String>,
}

/// The test case is usually a list of statements, occasionally one string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TestField {
    Lines(Vec<String>),
    Text(String),
}

impl TestField {
    fn join(&self) -> String {
        match self {
            TestField::Lines(lines) => lines.join("\n"),
            TestField::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BugLinks {
    email: Option<String>,
    bugtracker: Option<String>,
    fix: Option<String>,
}

/// Parse the raw bug list JSON into rows ready for insertion.
///
/// Entries whose status mentions "duplicate" are skipped: they lead to the
/// same fix link as the original report. Free-form status text collapses
/// onto the fixed status set, defaulting to Open (covers "verified").
pub fn parse_bug_entries(json: &str) -> Result<Vec<NewBugReport>, serde_json::Error> {
    let entries: Vec<BugEntry> = serde_json::from_str(json)?;

    let mut reports = Vec::with_capacity(entries.len());
    for entry in entries {
        let status_text = entry.status.as_deref().unwrap_or("").to_lowercase();
        if status_text.contains("duplicate") {
            continue;
        }

        let status = if status_text.contains("not a bug") {
            "Not a bug"
        } else if status_text.contains("fixed") {
            "Fixed"
        } else if status_text.contains("closed") {
            "Closed"
        } else {
            "Open"
        };

        let created_at = entry.date.as_deref().and_then(parse_bug_date);

        reports.push(NewBugReport {
            title: entry.title,
            dbms: entry.dbms,
            oracle: entry.oracle,
            status: status.to_string(),
            created_at,
            test_case: entry.test.as_ref().map(TestField::join),
            severity: entry.severity,
            url_email: entry.links.as_ref().and_then(|links| links.email.clone()),
            url_bugtracker: entry
                .links
                .as_ref()
                .and_then(|links| links.bugtracker.clone()),
            url_fix: entry.links.as_ref().and_then(|links| links.fix.clone()),
            reporter: entry.reporter.or_else(|| Some("Unknown".to_string())),
        });
    }

    Ok(reports)
}

/// Parse the bug list's "d/M/yyyy" dates into RFC 3339 midnight UTC.
fn parse_bug_date(date: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()?;
    let datetime = date.and_hms_opt(0, 0, 0)?;
    Some(format!("{}Z", datetime.format("%Y-%m-%dT%H:%M:%S")))
}

/// Populate the bug_reports table from the upstream bug list if it is
/// still empty.
pub async fn import_bug_reports(
    github: &GitHubClient,
    pool: &DatabasePool,
) -> Result<u64, SyncError> {
    let existing = BugReportRepository::count(pool)
        .await
        .map_err(DatabaseError::from)?;
    if existing > 0 {
        tracing::info!(
            "bug_reports already holds {} rows; skipping upstream fetch",
            existing
        );
        return Ok(0);
    }

    let json = github
        .fetch_file_contents(BUGS_OWNER, BUGS_REPO, BUGS_PATH)
        .await?;

    let reports = parse_bug_entries(&json)
        .map_err(|e| DatabaseError::TypeError(format!("bugs.json parse error: {}", e)))?;

    let inserted = BugReportRepository::insert_batch(pool, &reports)
        .await
        .map_err(DatabaseError::from)?;

    tracing::info!("Imported {} SQLancer bug reports", inserted);
    Ok(inserted)
}
