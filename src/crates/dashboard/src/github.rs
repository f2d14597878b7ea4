//! GitHub API client
//!
//! Covers the three endpoints the dashboard needs: issue search (paginated,
//! sorted by update time), per-issue comments and timeline events, and the
//! contents API used to pull the static `sqlancer/bugs` bug list. Transport
//! and auth failures propagate to the caller; there is no retry policy.

use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

const GITHUB_API_BASE: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;

/// Errors from the GitHub API client.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// GitHub returned a non-success status.
    #[error("GitHub API error {status}: {message}")]
    ApiError {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

/// An issue as returned by the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub state_reason: Option<String>,
    pub html_url: String,
    /// API URL of the repository the issue belongs to
    pub repository_url: String,
    pub user: IssueUser,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub created_at: String,
    pub updated_at: String,
}

impl RawIssue {
    /// Split the repository API URL into (owner, repo).
    pub fn owner_and_repo(&self) -> Result<(&str, &str)> {
        let mut segments = self.repository_url.rsplit('/');
        let repo = segments.next();
        let owner = segments.next();
        match (owner, repo) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok((owner, repo))
            }
            _ => Err(GitHubError::InvalidResponse(format!(
                "repository_url has no owner/repo: {}",
                self.repository_url
            ))),
        }
    }
}

/// Author of an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueUser {
    pub login: String,
}

/// A label attached to an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueLabel {
    pub name: String,
}

/// An issue comment.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub body: Option<String>,
}

/// A timeline event on an issue. The classifier scans these for linked
/// pull requests (`cross-referenced`) and referenced commits.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEvent {
    pub event: String,
    /// Commit SHA for `referenced`/`closed` events
    pub commit_id: Option<String>,
    /// Source of a `cross-referenced` event
    pub source: Option<TimelineSource>,
}

/// Source of a cross-referenced timeline event.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineSource {
    pub issue: Option<TimelineSourceIssue>,
}

/// The issue or pull request that referenced this one.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineSourceIssue {
    pub title: String,
    pub html_url: String,
    /// Present when the referencing item is a pull request
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    encoding: String,
}

/// GitHub API client
#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("sqlancer-dashboard/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, token }
    }

    /// Build a GET request with auth header if a token is available
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req.header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::ApiError { status, message });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GitHubError::InvalidResponse(e.to_string()))
    }

    /// Run an issue search, paging until an empty page comes back.
    pub async fn search_issues(&self, query: &str) -> Result<Vec<RawIssue>> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/search/issues?q={}&sort=updated&order=desc&per_page={}&page={}",
                GITHUB_API_BASE,
                urlencode(query),
                PER_PAGE,
                page
            );

            let response: SearchResponse = self.get_json(&url).await?;
            if response.items.is_empty() {
                break;
            }

            let count = response.items.len();
            all.extend(response.items);

            if count < PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    /// Fetch issues mentioning SQLancer that were updated after the given
    /// watermark.
    pub async fn fetch_issues_updated_after(
        &self,
        search_term: &str,
        watermark: &str,
    ) -> Result<Vec<RawIssue>> {
        let query = format!("{} is:issue updated:>{}", search_term, watermark);
        self.search_issues(&query).await
    }

    /// Full crawl of issues mentioning SQLancer. The search API caps how
    /// deep one query can page, so crawl in rounds with a descending
    /// `updated:<` bound, advancing the cursor to the oldest update seen.
    pub async fn fetch_all_issues(&self, search_term: &str) -> Result<Vec<RawIssue>> {
        let mut all: Vec<RawIssue> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let query = match &cursor {
                Some(updated_at) => {
                    format!("{} is:issue updated:<{}", search_term, updated_at)
                }
                None => format!("{} is:issue", search_term),
            };

            let issues = self.search_issues(&query).await?;
            if issues.is_empty() {
                break;
            }

            cursor = issues.last().map(|issue| issue.updated_at.clone());
            all.extend(issues);
        }

        Ok(all)
    }

    /// List the comments on an issue.
    pub async fn list_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<IssueComment>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments?per_page={}",
            GITHUB_API_BASE, owner, repo, number, PER_PAGE
        );
        self.get_json(&url).await
    }

    /// List the timeline events of an issue.
    pub async fn list_timeline_events(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<TimelineEvent>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/timeline?per_page={}",
            GITHUB_API_BASE, owner, repo, number, PER_PAGE
        );
        self.get_json(&url).await
    }

    /// Fetch a file through the contents API and decode its base64 payload.
    pub async fn fetch_file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String> {
        let url = format!("{}/repos/{}/{}/contents/{}", GITHUB_API_BASE, owner, repo, path);

        let contents: ContentsResponse = self.get_json(&url).await?;

        if contents.encoding != "base64" {
            return Err(GitHubError::InvalidResponse(format!(
                "unexpected contents encoding: {}",
                contents.encoding
            )));
        }

        // GitHub wraps the base64 payload with newlines
        let cleaned = contents.content.replace('\n', "");
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&cleaned)
            .map_err(|e| GitHubError::InvalidResponse(format!("base64 decode error: {}", e)))?;

        String::from_utf8(decoded)
            .map_err(|e| GitHubError::InvalidResponse(format!("UTF-8 decode error: {}", e)))
    }
}

/// Percent-encode a search query for use in a URL query string.
fn urlencode(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencode_search_query() {
        assert_eq!(
            urlencode("sqlancer is:issue updated:>2025-01-01T00:00:00Z"),
            "sqlancer%20is%3Aissue%20updated%3A%3E2025-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn test_owner_and_repo_split() {
        let issue: RawIssue = serde_json::from_value(serde_json::json!({
            "number": 1,
            "title": "t",
            "body": null,
            "state": "open",
            "state_reason": null,
            "html_url": "https://github.com/duckdb/duckdb/issues/1",
            "repository_url": "https://api.github.com/repos/duckdb/duckdb",
            "user": {"login": "octocat"},
            "labels": [],
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        }))
        .unwrap();

        let (owner, repo) = issue.owner_and_repo().unwrap();
        assert_eq!(owner, "duckdb");
        assert_eq!(repo, "duckdb");
    }

    #[test]
    fn test_search_response_parsing() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "number": 7,
                "title": "wrong result",
                "body": "SELECT ...",
                "state": "closed",
                "state_reason": "completed",
                "html_url": "https://github.com/a/b/issues/7",
                "repository_url": "https://api.github.com/repos/a/b",
                "user": {"login": "sqlancer-bot"},
                "labels": [{"name": "bug", "color": "d73a4a"}],
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-02T00:00:00Z"
            }]
        }))
        .unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].labels[0].name, "bug");
    }

    #[test]
    fn test_timeline_event_parsing() {
        let events: Vec<TimelineEvent> = serde_json::from_value(serde_json::json!([
            {"event": "referenced", "commit_id": "abc123"},
            {"event": "cross-referenced", "source": {"issue": {
                "title": "Fix DISTINCT handling",
                "html_url": "https://github.com/a/b/pull/8",
                "pull_request": {"url": "https://api.github.com/repos/a/b/pulls/8"}
            }}},
            {"event": "labeled"}
        ]))
        .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].commit_id.as_deref(), Some("abc123"));
        let source_issue = events[1].source.as_ref().unwrap().issue.as_ref().unwrap();
        assert!(source_issue.pull_request.is_some());
        assert!(events[2].source.is_none());
    }
}
