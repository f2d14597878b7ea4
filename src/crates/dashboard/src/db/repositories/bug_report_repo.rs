//! Bug report repository for database operations

use crate::db::connection::DatabasePool;
use crate::db::models::{BugReport, NewBugReport};
use sqlx::QueryBuilder;

/// Bug report repository for the imported SQLancer bug list
pub struct BugReportRepository;

impl BugReportRepository {
    /// Insert a batch of parsed bug list entries with a single multi-row
    /// INSERT. Used once, when the table is first populated.
    pub async fn insert_batch(
        pool: &DatabasePool,
        reports: &[NewBugReport],
    ) -> Result<u64, sqlx::Error> {
        if reports.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;
        // SQLite caps the number of bound variables per statement; chunk the
        // import (the upstream list has a few thousand entries).
        for chunk in reports.chunks(500) {
            let mut builder = QueryBuilder::new(
                "INSERT INTO bug_reports (title, dbms, oracle, status, created_at, test_case, severity, url_email, url_bugtracker, url_fix, reporter) ",
            );
            builder.push_values(chunk, |mut row, report| {
                row.push_bind(&report.title)
                    .push_bind(&report.dbms)
                    .push_bind(&report.oracle)
                    .push_bind(&report.status)
                    .push_bind(&report.created_at)
                    .push_bind(&report.test_case)
                    .push_bind(&report.severity)
                    .push_bind(&report.url_email)
                    .push_bind(&report.url_bugtracker)
                    .push_bind(&report.url_fix)
                    .push_bind(&report.reporter);
            });

            let result = builder.build().execute(pool).await?;
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }

    /// Get a bug report by ID
    pub async fn get_by_id(pool: &DatabasePool, id: i64) -> Result<Option<BugReport>, sqlx::Error> {
        sqlx::query_as::<_, BugReport>("SELECT * FROM bug_reports WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all bug reports, newest first
    pub async fn list(pool: &DatabasePool) -> Result<Vec<BugReport>, sqlx::Error> {
        sqlx::query_as::<_, BugReport>("SELECT * FROM bug_reports ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Update the reviewer-editable fields of a bug report. Unset fields
    /// keep their current value. Returns the number of matched rows.
    pub async fn update_fields(
        pool: &DatabasePool,
        id: i64,
        dbms: Option<&str>,
        oracle: Option<&str>,
        status: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bug_reports
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

        let mut builder = QueryBuilder::new("DELETE FROM bug_reports WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Count total bug reports
    pub async fn count(pool: &DatabasePool) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bug_reports")
            .fetch_one(pool)
            .await?;
        Ok(result.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn setup_db() -> SqlitePool {
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

    fn sample_report(title: &str, created_at: &str) -> NewBugReport {
        NewBugReport {
            title: Some(title.to_string()),
            dbms: Some("DuckDB".to_string()),
            oracle: Some("NoREC".to_string()),
            status: "Fixed".to_string(),
            created_at: Some(created_at.to_string()),
            test_case: Some("SELECT 1;".to_string()),
            severity: Some("critical".to_string()),
            url_email: None,
            url_bugtracker: Some("https://github.com/duckdb/duckdb/issues/42".to_string()),
            url_fix: None,
            reporter: Some("Unknown".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_batch_and_list() {
        let pool = setup_db().await;

        let reports = vec![
            sample_report("first", "2020-01-01T00:00:00Z"),
            sample_report("second", "2021-01-01T00:00:00Z"),
        ];
        let inserted = BugReportRepository::insert_batch(&pool, &reports).await.unwrap();
        assert_eq!(inserted, 2);

        let listed = BugReportRepository::list(&pool).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title.as_deref(), Some("second"));
        assert_eq!(listed[1].title.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_update_fields() {
        let pool = setup_db().await;

        let reports = vec![sample_report("one", "2020-01-01T00:00:00Z")];
        BugReportRepository::insert_batch(&pool, &reports).await.unwrap();
        let id = BugReportRepository::list(&pool).await.unwrap()[0].id;

        let matched = BugReportRepository::update_fields(&pool, id, None, None, Some("Closed"))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let report = BugReportRepository::get_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(report.status, "Closed");
        assert_eq!(report.dbms.as_deref(), Some("DuckDB"));
    }

    #[tokio::test]
    async fn test_delete_many_unknown_ids() {
        let pool = setup_db().await;

        let removed = BugReportRepository::delete_many(&pool, &[1, 2, 3]).await.unwrap();
        assert_eq!(removed, 0);
    }
}
