//! HTTP-level API tests against a server bound to an ephemeral port.

use std::sync::Arc;

use dashboard::api::routes::create_router;
use dashboard::classify::Classifier;
use dashboard::db::models::NewIssue;
use dashboard::db::repositories::IssueRepository;
use dashboard::db::DatabaseConnection;
use dashboard::github::GitHubClient;
use dashboard::sync::SyncService;
use llm::remote::OpenAiClient;
use llm::RemoteLlmConfig;

/// Start the app on 127.0.0.1:0 and return its base URL plus the database
/// handle for seeding.
async fn spawn_app() -> (String, DatabaseConnection) {
    let db = DatabaseConnection::with_max_connections("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    // External clients are never exercised by these tests.
    let github = GitHubClient::new(None);
    let classifier = Classifier::new(OpenAiClient::new(RemoteLlmConfig::new(
        "test-key",
        "https://api.openai.com/v1",
        "gpt-4o-mini",
    )));
    let sync = Arc::new(SyncService::new(github, classifier, "sqlancer"));

    let app = create_router(db.clone(), sync);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    (format!("http://{}", addr), db)
}

fn issue(url: &str, status: &str, created_at: &str) -> NewIssue {
    NewIssue {
        creator: "octocat".to_string(),
        title: "incorrect result".to_string(),
        description: Some("found by SQLancer".to_string()),
        dbms: "MySQL".to_string(),
        oracle: "TLP (WHERE)".to_string(),
        status: status.to_string(),
        html_url: url.to_string(),
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
    }
}

async fn seed(db: &DatabaseConnection, issues: &[NewIssue]) -> Vec<i64> {
    let mut conn = db.pool().acquire().await.unwrap();
    let inserted = IssueRepository::insert_batch(&mut conn, issues).await.unwrap();
    inserted.into_iter().map(|issue| issue.id).collect()
}

#[tokio::test]
async fn test_health() {
    let (base, _db) = spawn_app().await;

    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_enumeration_endpoints() {
    let (base, _db) = spawn_app().await;

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/dbms", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let dbms = body["data"]["dbms"].as_array().unwrap();
    assert_eq!(dbms.len(), 26);
    assert!(dbms.contains(&serde_json::json!("SQLite3")));
    assert!(dbms.contains(&serde_json::json!("N/A")));

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/oracles", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["data"]["oracles"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("TLP (HAVING)")));

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/statuses", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["data"]["statuses"],
        serde_json::json!(["Open", "Fixed", "Closed", "Not a bug"])
    );
}

#[tokio::test]
async fn test_list_issues_newest_first() {
    let (base, db) = spawn_app().await;
    seed(
        &db,
        &[
            issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z"),
            issue("https://github.com/x/y/issues/2", "Open", "2025-01-03T00:00:00Z"),
            issue("https://github.com/x/y/issues/3", "Open", "2025-01-02T00:00:00Z"),
        ],
    )
    .await;

    let response = reqwest::get(format!("{}/api/v1/issues", base)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let issues = body["data"].as_array().unwrap();
    assert_eq!(issues.len(), 3);

    let urls: Vec<&str> = issues
        .iter()
        .map(|issue| issue["html_url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://github.com/x/y/issues/2",
            "https://github.com/x/y/issues/3",
            "https://github.com/x/y/issues/1",
        ]
    );
}

#[tokio::test]
async fn test_update_issue_returns_204_and_is_visible() {
    let (base, db) = spawn_app().await;
    let ids = seed(
        &db,
        &[issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z")],
    )
    .await;

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/v1/issues/{}", base, ids[0]))
        .json(&serde_json::json!({"status": "Fixed", "dbms": "TiDB"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/issues", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"][0]["status"], "Fixed");
    assert_eq!(body["data"][0]["dbms"], "TiDB");
    assert_eq!(body["data"][0]["oracle"], "TLP (WHERE)");
}

#[tokio::test]
async fn test_update_unknown_issue_returns_404() {
    let (base, _db) = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/v1/issues/9999", base))
        .json(&serde_json::json!({"status": "Fixed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_with_invalid_status_returns_422() {
    let (base, db) = spawn_app().await;
    let ids = seed(
        &db,
        &[issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z")],
    )
    .await;

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/v1/issues/{}", base, ids[0]))
        .json(&serde_json::json!({"status": "resolved"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_update_with_empty_body_returns_400() {
    let (base, db) = spawn_app().await;
    let ids = seed(
        &db,
        &[issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z")],
    )
    .await;

    let client = reqwest::Client::new();
    let response = client
        .put(format!("{}/api/v1/issues/{}", base, ids[0]))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_delete_issues_removes_exactly_given_rows() {
    let (base, db) = spawn_app().await;
    let ids = seed(
        &db,
        &[
            issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z"),
            issue("https://github.com/x/y/issues/2", "Open", "2025-01-02T00:00:00Z"),
            issue("https://github.com/x/y/issues/3", "Open", "2025-01-03T00:00:00Z"),
        ],
    )
    .await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{}/api/v1/issues", base))
        .json(&serde_json::json!({"ids": [ids[0], ids[2]]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/issues", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let remaining = body["data"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining[0]["html_url"],
        "https://github.com/x/y/issues/2"
    );
}

#[tokio::test]
async fn test_delete_unknown_issues_returns_404() {
    let (base, _db) = spawn_app().await;

    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{}/api/v1/issues", base))
        .json(&serde_json::json!({"ids": [111, 222]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_dbms_summary_over_http() {
    let (base, db) = spawn_app().await;
    seed(
        &db,
        &[
            issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z"),
            issue("https://github.com/x/y/issues/2", "Fixed", "2025-01-02T00:00:00Z"),
        ],
    )
    .await;

    let body: serde_json::Value = reqwest::get(format!("{}/api/v1/summary/dbms", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["dbms"], "MySQL");
    assert_eq!(rows[0]["total_count"], 2);
    assert_eq!(rows[0]["open_count"], 1);
    assert_eq!(rows[0]["fixed_count"], 1);
}

#[tokio::test]
async fn test_monthly_summary_with_ids_filter() {
    let (base, db) = spawn_app().await;
    let ids = seed(
        &db,
        &[
            issue("https://github.com/x/y/issues/1", "Open", "2025-01-01T00:00:00Z"),
            issue("https://github.com/x/y/issues/2", "Open", "2025-02-01T00:00:00Z"),
        ],
    )
    .await;

    let body: serde_json::Value = reqwest::get(format!(
        "{}/api/v1/summary/monthly?ids={}",
        base, ids[1]
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    let series = body["data"]["MySQL"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["month"], "2025-02");
    assert_eq!(series[0]["total_bugs"], 1);

    // Bad id list is a 400
    let response = reqwest::get(format!("{}/api/v1/summary/monthly?ids=1,x", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
