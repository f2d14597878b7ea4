//! Issue classifier
//!
//! Turns raw GitHub issues into classified rows by prompting a hosted
//! language model constrained to a fixed output schema (DBMS, test oracle,
//! status). Issues are processed in fixed-size batches; within a batch all
//! model calls run concurrently and are awaited together, and consecutive
//! batches are spaced by a minimum wall-clock interval to respect the model
//! API's rate limit. A single failed call aborts the whole batch.

use crate::db::models::NewIssue;
use crate::domain::{Dbms, IssueStatus, TestOracle};
use crate::github::{GitHubClient, GitHubError, IssueComment, RawIssue, TimelineEvent};
use futures::future::try_join_all;
use llm::{ChatModel, ChatRequest, LlmError, Message};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{sleep_until, Duration, Instant};

const SYSTEM_PROMPT: &str =
    "You are an AI assistant specialized in analyzing GitHub issues for bugs found by SQLancer.";

/// Default number of issues classified per batch.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Default minimum spacing between batch starts, in seconds.
pub const DEFAULT_BATCH_INTERVAL_SECS: u64 = 60;

/// Errors from the classification pipeline.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Fetching comments or timeline events failed.
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// The model call failed.
    #[error("Model error: {0}")]
    Model(#[from] LlmError),

    /// The model reply did not conform to the schema.
    #[error("Invalid classification: {0}")]
    InvalidClassification(String),
}

/// The schema-constrained model output.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Classification {
    pub dbms: Dbms,
    pub oracle: TestOracle,
    pub status: IssueStatus,
}

/// One issue with the side context the prompt draws on.
#[derive(Debug, Clone)]
pub struct IssueBundle {
    pub issue: RawIssue,
    pub comments: Vec<IssueComment>,
    pub events: Vec<TimelineEvent>,
}

/// Classifies issues through a [`ChatModel`].
pub struct Classifier {
    model: Box<dyn ChatModel>,
    batch_size: usize,
    batch_interval: Duration,
}

impl Classifier {
    pub fn new(model: impl ChatModel + 'static) -> Self {
        Self {
            model: Box::new(model),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_interval: Duration::from_secs(DEFAULT_BATCH_INTERVAL_SECS),
        }
    }

    /// Override the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Override the minimum spacing between batch starts.
    pub fn with_batch_interval(mut self, batch_interval: Duration) -> Self {
        self.batch_interval = batch_interval;
        self
    }

    /// Classify a set of freshly fetched issues. Comments and timeline
    /// events are gathered per issue, then the whole batch is submitted to
    /// the model concurrently.
    pub async fn classify_issues(
        &self,
        github: &GitHubClient,
        issues: Vec<RawIssue>,
    ) -> Result<Vec<NewIssue>, ClassifyError> {
        let total = issues.len();
        let mut classified = Vec::with_capacity(total);
        let batches: Vec<Vec<RawIssue>> = issues
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let batch_start = Instant::now();
            tracing::info!(
                "Classifying batch {}/{} ({} issues)",
                index + 1,
                batch_count,
                batch.len()
            );

            let bundles = try_join_all(
                batch
                    .into_iter()
                    .map(|issue| Self::gather_context(github, issue)),
            )
            .await?;

            let results =
                try_join_all(bundles.iter().map(|bundle| self.classify_bundle(bundle))).await?;
            classified.extend(results);

            // Keep batch starts at least one interval apart
            if index + 1 < batch_count {
                sleep_until(batch_start + self.batch_interval).await;
            }
        }

        tracing::info!("Classified {} issues", classified.len());
        Ok(classified)
    }

    /// Classify one issue whose context has already been gathered.
    pub async fn classify_bundle(&self, bundle: &IssueBundle) -> Result<NewIssue, ClassifyError> {
        let (owner, repo) = bundle.issue.owner_and_repo()?;
        let prompt = build_prompt(&bundle.issue, &bundle.comments, &bundle.events, owner, repo);

        let request = ChatRequest::new(vec![Message::system(SYSTEM_PROMPT), Message::human(prompt)])
            .with_temperature(0.2)
            .with_response_format(response_schema());

        let response = self.model.chat(request).await?;
        let classification = parse_classification(&response.message.content)?;

        Ok(NewIssue {
            creator: bundle.issue.user.login.clone(),
            title: bundle.issue.title.clone(),
            description: bundle.issue.body.clone(),
            dbms: classification.dbms.as_str().to_string(),
            oracle: classification.oracle.as_str().to_string(),
            status: classification.status.as_str().to_string(),
            html_url: bundle.issue.html_url.clone(),
            created_at: bundle.issue.created_at.clone(),
            updated_at: bundle.issue.updated_at.clone(),
        })
    }

    async fn gather_context(
        github: &GitHubClient,
        issue: RawIssue,
    ) -> Result<IssueBundle, ClassifyError> {
        let (owner, repo) = issue.owner_and_repo()?;
        let comments = github.list_comments(owner, repo, issue.number).await?;
        let events = github.list_timeline_events(owner, repo, issue.number).await?;

        Ok(IssueBundle {
            issue,
            comments,
            events,
        })
    }
}

/// Parse a model reply into a [`Classification`].
pub fn parse_classification(content: &str) -> Result<Classification, ClassifyError> {
    serde_json::from_str(content).map_err(|e| {
        ClassifyError::InvalidClassification(format!("{} (reply: {})", e, content))
    })
}

/// The strict JSON schema the model output must conform to.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "bug_report",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "dbms": {"type": "string", "enum": Dbms::variants()},
                    "oracle": {"type": "string", "enum": TestOracle::variants()},
                    "status": {"type": "string", "enum": IssueStatus::variants()}
                },
                "required": ["dbms", "oracle", "status"],
                "additionalProperties": false
            }
        }
    })
}

/// Build the analysis prompt for one issue.
fn build_prompt(
    issue: &RawIssue,
    comments: &[IssueComment],
    events: &[TimelineEvent],
    owner: &str,
    repo: &str,
) -> String {
    let state = match &issue.state_reason {
        Some(reason) => format!("{} ({})", issue.state, reason),
        None => issue.state.clone(),
    };

    let labels = issue
        .labels
        .iter()
        .map(|label| label.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let comment_bodies = comments
        .iter()
        .filter_map(|comment| comment.body.as_deref())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = format!(
        "Your task is to analyze a GitHub issue to determine whether it is a bug found by SQLancer and extract the following fields:

DBMS: Identify the DBMS the issue is associated with based on the repository or issue details.
This should be one of the DBMSs supported by SQLancer, or \"N/A\" otherwise.

Oracle: If the issue is a bug found by SQLancer, identify the test oracle used to find the bug. Otherwise, it should be \"N/A\".

Status: Classify the issue into one of the following statuses:

- Not a bug: The issue is not a bug found by SQLancer (e.g., it is unrelated to SQLancer, expected behavior, or a feature request).
- Open: The issue is a bug found by SQLancer that has not yet been fixed.
- Fixed: The issue is a bug found by SQLancer that has been resolved.
- Closed: The issue is a bug found by SQLancer that was closed without being fixed.

Now, extract the appropriate values based on the following issue:

Repository: {}/{}
State: {}
Title: {}
Labels: {}

Description:
{}

Comments:
{}",
        owner,
        repo,
        state,
        issue.title,
        labels,
        issue.body.as_deref().unwrap_or(""),
        comment_bodies,
    );

    let linked = linked_work_section(events);
    if !linked.is_empty() {
        prompt.push_str("\n\nLinked pull requests and commits:\n");
        prompt.push_str(&linked);
    }

    prompt
}

/// Summarize pull requests and commits referenced from the issue timeline.
fn linked_work_section(events: &[TimelineEvent]) -> String {
    let mut lines = Vec::new();

    for event in events {
        match event.event.as_str() {
            "cross-referenced" => {
                if let Some(source_issue) = event
                    .source
                    .as_ref()
                    .and_then(|source| source.issue.as_ref())
                {
                    if source_issue.pull_request.is_some() {
                        lines.push(format!(
                            "- PR: {} ({})",
                            source_issue.title, source_issue.html_url
                        ));
                    }
                }
            }
            "referenced" | "closed" => {
                if let Some(commit_id) = &event.commit_id {
                    lines.push(format!("- Commit: {}", commit_id));
                }
            }
            _ => {}
        }
    }

    lines.join("\n")
}
