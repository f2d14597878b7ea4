//! Issue repository for database operations
//!
//! Besides CRUD this hosts the bulk insert used by the refresh pipeline and
//! the aggregate queries behind the summary endpoints.

use crate::db::connection::DatabasePool;
use crate::db::models::{Issue, NewIssue};
use crate::domain::{Dbms, IssueStatus, TestOracle};
use serde::Serialize;
use sqlx::sqlite::SqliteConnection;
use sqlx::{FromRow, QueryBuilder};

/// Per-DBMS issue counts for the summary table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DbmsSummaryRow {
    pub dbms: String,
    pub total_count: i64,
    pub open_count: i64,
    pub fixed_count: i64,
    pub closed_count: i64,
}

/// Per-oracle issue counts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OracleSummaryRow {
    pub oracle: String,
    pub total_count: i64,
    pub open_count: i64,
    pub fixed_count: i64,
    pub closed_count: i64,
}

/// Per-status issue counts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusSummaryRow {
    pub status: String,
    pub total_count: i64,
}

/// Bug count for one DBMS in one month.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyCountRow {
    pub dbms: String,
    /// "YYYY-MM"
    pub month: String,
    pub total_bugs: i64,
}

/// Issue repository for managing issue database operations
pub struct IssueRepository;

impl IssueRepository {
    /// Insert a batch of new issues with a single multi-row INSERT.
    ///
    /// Runs on a connection so the refresh transaction can own it.
    pub async fn insert_batch(
        conn: &mut SqliteConnection,
        issues: &[NewIssue],
    ) -> Result<Vec<Issue>, sqlx::Error> {
        if issues.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO issues (creator, title, description, dbms, oracle, status, html_url, created_at, updated_at) ",
        );
        builder.push_values(issues, |mut row, issue| {
            row.push_bind(&issue.creator)
                .push_bind(&issue.title)
                .push_bind(&issue.description)
                .push_bind(&issue.dbms)
                .push_bind(&issue.oracle)
                .push_bind(&issue.status)
                .push_bind(&issue.html_url)
                .push_bind(&issue.created_at)
                .push_bind(&issue.updated_at);
        });
        builder.push(" RETURNING *");

        builder.build_query_as::<Issue>().fetch_all(&mut *conn).await
    }

    /// Re-apply a classification to an existing row, keyed by the unique
    /// issue URL. Returns the number of rows that matched: zero means the
    /// issue is no longer stored (deleted upstream or removed by a user).
    pub async fn update_by_url(
        conn: &mut SqliteConnection,
        issue: &NewIssue,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE issues
             SET title = ?, description = ?, dbms = ?, oracle = ?, status = ?, updated_at = ?
             WHERE html_url = ?",
        )
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(&issue.dbms)
        .bind(&issue.oracle)
        .bind(&issue.status)
        .bind(&issue.updated_at)
        .bind(&issue.html_url)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Fetch a row by its unique URL.
    pub async fn get_by_url(
        conn: &mut SqliteConnection,
        html_url: &str,
    ) -> Result<Option<Issue>, sqlx::Error> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE html_url = ?")
            .bind(html_url)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Get an issue by ID
    pub async fn get_by_id(pool: &DatabasePool, id: i64) -> Result<Option<Issue>, sqlx::Error> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all issues, newest first
    pub async fn list(pool: &DatabasePool) -> Result<Vec<Issue>, sqlx::Error> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Update the reviewer-editable fields of an issue. Unset fields keep
    /// their current value. Returns the number of matched rows.
    pub async fn update_fields(
        pool: &DatabasePool,
        id: i64,
        dbms: Option<&str>,
        oracle: Option<&str>,
        status: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE issues
             SET dbms = COALESCE(?, dbms),
                 oracle = COALESCE(?, oracle),
                 status = COALESCE(?, status)
             WHERE id = ?",
        )
        .bind(dbms)
        .bind(oracle)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete the given rows. Returns the number of rows removed.
    pub async fn delete_many(pool: &DatabasePool, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("DELETE FROM issues WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Count total issues
    pub async fn count(pool: &DatabasePool) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM issues")
            .fetch_one(pool)
            .await?;
        Ok(result.0)
    }

    /// Issue counts grouped by DBMS. Rows with the "N/A" sentinel and rows
    /// classified "Not a bug" are not bugs and are excluded.
    pub async fn summary_by_dbms(pool: &DatabasePool) -> Result<Vec<DbmsSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, DbmsSummaryRow>(
            "SELECT dbms,
                    COUNT(*) AS total_count,
                    SUM(status = 'Open') AS open_count,
                    SUM(status = 'Fixed') AS fixed_count,
                    SUM(status = 'Closed') AS closed_count
             FROM issues
             WHERE dbms IS NOT NULL AND dbms <> ? AND status <> ?
             GROUP BY dbms
             ORDER BY dbms ASC",
        )
        .bind(Dbms::NOT_APPLICABLE)
        .bind(IssueStatus::NOT_A_BUG)
        .fetch_all(pool)
        .await
    }

    /// Issue counts grouped by test oracle, with the same exclusions as the
    /// DBMS summary.
    pub async fn summary_by_oracle(
        pool: &DatabasePool,
    ) -> Result<Vec<OracleSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, OracleSummaryRow>(
            "SELECT oracle,
                    COUNT(*) AS total_count,
                    SUM(status = 'Open') AS open_count,
                    SUM(status = 'Fixed') AS fixed_count,
                    SUM(status = 'Closed') AS closed_count
             FROM issues
             WHERE oracle IS NOT NULL AND oracle <> ? AND status <> ?
             GROUP BY oracle
             ORDER BY oracle ASC",
        )
        .bind(TestOracle::NOT_APPLICABLE)
        .bind(IssueStatus::NOT_A_BUG)
        .fetch_all(pool)
        .await
    }

    /// Issue counts grouped by status. "Not a bug" is a real triage
    /// category here, so every status is included.
    pub async fn summary_by_status(
        pool: &DatabasePool,
    ) -> Result<Vec<StatusSummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, StatusSummaryRow>(
            "SELECT status, COUNT(*) AS total_count
             FROM issues
             GROUP BY status
             ORDER BY status ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Per-DBMS bug counts bucketed by creation month ("YYYY-MM"),
    /// optionally restricted to the given row ids. Same bug exclusions as
    /// the DBMS summary.
    pub async fn monthly_counts(
        pool: &DatabasePool,
        ids: Option<&[i64]>,
    ) -> Result<Vec<MonthlyCountRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(
            "SELECT dbms,
                    strftime('%Y-%m', created_at) AS month,
                    COUNT(*) AS total_bugs
             FROM issues
             WHERE dbms IS NOT NULL AND dbms <> ",
        );
        builder.push_bind(Dbms::NOT_APPLICABLE);
        builder.push(" AND status <> ");
        builder.push_bind(IssueStatus::NOT_A_BUG);

        if let Some(ids) = ids {
            builder.push(" AND id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id);
            }
            separated.push_unseparated(")");
        }

        builder.push(" GROUP BY dbms, month ORDER BY month ASC");

        builder
            .build_query_as::<MonthlyCountRow>()
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn setup_db() -> SqlitePool {
        // One connection: every pooled connection to ":memory:" would
        // otherwise open its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    fn sample_issue(url: &str, status: &str, created_at: &str) -> NewIssue {
        NewIssue {
            creator: "octocat".to_string(),
            title: "SELECT with DISTINCT returns wrong row count".to_string(),
            description: Some("Found by SQLancer".to_string()),
            dbms: "SQLite3".to_string(),
            oracle: "NoREC".to_string(),
            status: status.to_string(),
            html_url: url.to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_batch_returns_rows() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![
            sample_issue("https://github.com/a/b/issues/1", "Open", "2025-01-01T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/2", "Fixed", "2025-01-02T00:00:00Z"),
        ];
        let inserted = IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();

        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].creator, "octocat");
        assert!(inserted[0].id > 0);
    }

    #[tokio::test]
    async fn test_insert_batch_empty() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let inserted = IssueRepository::insert_batch(&mut conn, &[]).await.unwrap();
        assert!(inserted.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_url_rejected() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![sample_issue(
            "https://github.com/a/b/issues/1",
            "Open",
            "2025-01-01T00:00:00Z",
        )];
        IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();

        let result = IssueRepository::insert_batch(&mut conn, &batch).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![
            sample_issue("https://github.com/a/b/issues/1", "Open", "2025-01-01T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/2", "Open", "2025-03-01T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/3", "Open", "2025-02-01T00:00:00Z"),
        ];
        IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();
        drop(conn);

        let listed = IssueRepository::list(&pool).await.unwrap();
        let urls: Vec<&str> = listed.iter().map(|i| i.html_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://github.com/a/b/issues/2",
                "https://github.com/a/b/issues/3",
                "https://github.com/a/b/issues/1",
            ]
        );
    }

    #[tokio::test]
    async fn test_update_by_url_missing_row() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let issue = sample_issue("https://github.com/a/b/issues/404", "Open", "2025-01-01T00:00:00Z");
        let matched = IssueRepository::update_by_url(&mut conn, &issue).await.unwrap();
        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn test_update_fields_partial() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![sample_issue(
            "https://github.com/a/b/issues/1",
            "Open",
            "2025-01-01T00:00:00Z",
        )];
        let inserted = IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();
        drop(conn);
        let id = inserted[0].id;

        let matched = IssueRepository::update_fields(&pool, id, None, None, Some("Fixed"))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let issue = IssueRepository::get_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(issue.status, "Fixed");
        // Untouched fields keep their values
        assert_eq!(issue.dbms.as_deref(), Some("SQLite3"));
        assert_eq!(issue.oracle.as_deref(), Some("NoREC"));
    }

    #[tokio::test]
    async fn test_update_fields_unknown_id() {
        let pool = setup_db().await;

        let matched = IssueRepository::update_fields(&pool, 999, None, None, Some("Fixed"))
            .await
            .unwrap();
        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn test_delete_many_counts_removed_rows() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![
            sample_issue("https://github.com/a/b/issues/1", "Open", "2025-01-01T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/2", "Open", "2025-01-02T00:00:00Z"),
        ];
        let inserted = IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();
        drop(conn);

        let removed =
            IssueRepository::delete_many(&pool, &[inserted[0].id, 999]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(IssueRepository::count(&pool).await.unwrap(), 1);

        let removed = IssueRepository::delete_many(&pool, &[12345]).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_monthly_counts_buckets_by_month() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![
            sample_issue("https://github.com/a/b/issues/1", "Open", "2025-01-05T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/2", "Open", "2025-01-20T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/3", "Fixed", "2025-03-01T00:00:00Z"),
        ];
        IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();
        drop(conn);

        let rows = IssueRepository::monthly_counts(&pool, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, "2025-01");
        assert_eq!(rows[0].total_bugs, 2);
        assert_eq!(rows[1].month, "2025-03");
        assert_eq!(rows[1].total_bugs, 1);
    }

    #[tokio::test]
    async fn test_monthly_counts_ids_filter() {
        let pool = setup_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let batch = vec![
            sample_issue("https://github.com/a/b/issues/1", "Open", "2025-01-05T00:00:00Z"),
            sample_issue("https://github.com/a/b/issues/2", "Open", "2025-01-20T00:00:00Z"),
        ];
        let inserted = IssueRepository::insert_batch(&mut conn, &batch).await.unwrap();
        drop(conn);

        let rows = IssueRepository::monthly_counts(&pool, Some(&[inserted[0].id]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_bugs, 1);
    }
}
