//! Synchronization pipeline: fetch, classify, reconcile.
//!
//! A refresh reads the stored watermark, fetches the GitHub issues updated
//! since then, classifies them, and reconciles the batch against the rows
//! already stored. The whole reconciliation runs in one transaction; any
//! failure rolls back the entire batch.

pub mod bug_reports;

use crate::classify::{Classifier, ClassifyError};
use crate::db::connection::DatabasePool;
use crate::db::models::metadata::LATEST_UPDATED_AT;
use crate::db::models::{Issue, NewIssue};
use crate::db::repositories::{IssueRepository, MetadataRepository};
use crate::db::{DatabaseError, DbResult};
use crate::github::{GitHubClient, GitHubError};
use serde::Serialize;
use thiserror::Error;

/// Errors from the sync pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// What a refresh did: the rows it inserted and the rows it updated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshOutcome {
    pub new_issues: Vec<Issue>,
    pub updated_issues: Vec<Issue>,
}

/// Reconcile a batch of freshly classified issues against the stored rows.
///
/// An issue created after the watermark is treated as new and bulk-inserted;
/// any other issue is applied as an update keyed by its unique URL. An
/// update matching zero rows means the upstream issue was deleted and is
/// silently dropped rather than re-inserted. The watermark advances to the
/// newest `updated_at` in the batch. With no watermark stored yet (first
/// run) every issue is new.
///
/// Note: the split compares each issue's `created_at` against a watermark
/// derived from `updated_at`. This mirrors the data source's behavior and
/// is deliberately left as-is.
pub async fn reconcile_and_save(
    pool: &DatabasePool,
    batch: &[NewIssue],
    watermark: Option<&str>,
) -> DbResult<RefreshOutcome> {
    if batch.is_empty() {
        return Ok(RefreshOutcome::default());
    }

    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;

    let mut to_insert: Vec<NewIssue> = Vec::new();
    let mut updated_issues: Vec<Issue> = Vec::new();
    let mut skipped = 0usize;

    for issue in batch {
        let is_new = match watermark {
            Some(watermark) => issue.created_at.as_str() > watermark,
            None => true,
        };

        if is_new {
            to_insert.push(issue.clone());
            continue;
        }

        let matched = IssueRepository::update_by_url(&mut tx, issue)
            .await
            .map_err(DatabaseError::from)?;
        if matched == 0 {
            // The issue vanished upstream; do not reintroduce it.
            skipped += 1;
            continue;
        }

        if let Some(row) = IssueRepository::get_by_url(&mut tx, &issue.html_url)
            .await
            .map_err(DatabaseError::from)?
        {
            updated_issues.push(row);
        }
    }

    let new_issues = IssueRepository::insert_batch(&mut tx, &to_insert)
        .await
        .map_err(DatabaseError::from)?;

    if let Some(latest) = batch.iter().map(|issue| issue.updated_at.as_str()).max() {
        MetadataRepository::set(&mut tx, LATEST_UPDATED_AT, latest)
            .await
            .map_err(DatabaseError::from)?;
    }

    tx.commit().await.map_err(DatabaseError::from)?;

    tracing::info!(
        "Refresh reconciled {} new, {} updated, {} skipped (deleted upstream)",
        new_issues.len(),
        updated_issues.len(),
        skipped
    );

    Ok(RefreshOutcome {
        new_issues,
        updated_issues,
    })
}

/// Orchestrates a refresh end to end.
pub struct SyncService {
    github: GitHubClient,
    classifier: Classifier,
    search_term: String,
}

impl SyncService {
    pub fn new(github: GitHubClient, classifier: Classifier, search_term: impl Into<String>) -> Self {
        Self {
            github,
            classifier,
            search_term: search_term.into(),
        }
    }

    pub fn github(&self) -> &GitHubClient {
        &self.github
    }

    /// Fetch, classify, and reconcile everything updated since the stored
    /// watermark. The first run (no watermark) crawls every matching issue.
    pub async fn refresh(&self, pool: &DatabasePool) -> Result<RefreshOutcome, SyncError> {
        let watermark = MetadataRepository::get(pool, LATEST_UPDATED_AT)
            .await
            .map_err(DatabaseError::from)?;

        let raw_issues = match watermark.as_deref() {
            Some(watermark) => {
                tracing::info!("Fetching issues updated after {}", watermark);
                self.github
                    .fetch_issues_updated_after(&self.search_term, watermark)
                    .await?
            }
            None => {
                tracing::info!("No watermark stored; crawling all issues");
                self.github.fetch_all_issues(&self.search_term).await?
            }
        };

        tracing::info!("Fetched {} issues from GitHub", raw_issues.len());

        let classified = self.classifier.classify_issues(&self.github, raw_issues).await?;
        let outcome = reconcile_and_save(pool, &classified, watermark.as_deref()).await?;

        Ok(outcome)
    }
}
