//! Aggregate (summary) endpoint handlers
//!
//! Pre-aggregated counts for the dashboard charts. The monthly series is
//! gap-filled: every DBMS gets an entry for every month between the
//! earliest and latest bug, with zero counts where nothing was found.

use axum::extract::{Query, State};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::{
    error::{ApiError, ApiResult},
    middleware::validation,
    models::MonthlyQuery,
    response,
    routes::AppState,
};
use crate::db::repositories::{IssueRepository, MonthlyCountRow};

/// One month of one DBMS's monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    /// "YYYY-MM"
    pub month: String,
    pub total_bugs: i64,
}

/// Issue counts grouped by DBMS
///
/// GET /api/v1/summary/dbms
pub async fn summary_by_dbms(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let rows = IssueRepository::summary_by_dbms(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(rows))
}

/// Issue counts grouped by test oracle
///
/// GET /api/v1/summary/oracles
pub async fn summary_by_oracle(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let rows = IssueRepository::summary_by_oracle(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(rows))
}

/// Issue counts grouped by status
///
/// GET /api/v1/summary/statuses
pub async fn summary_by_status(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let rows = IssueRepository::summary_by_status(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(rows))
}

/// Per-DBMS monthly bug counts, optionally restricted to a set of row ids
///
/// GET /api/v1/summary/monthly?ids=1,2,3
pub async fn summary_monthly(
    State(app_state): State<AppState>,
    Query(query): Query<MonthlyQuery>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let ids = match query.ids.as_deref() {
        Some(raw) => Some(validation::parse_id_list(raw)?),
        None => None,
    };

    let pool = app_state.db.pool();
    let rows = IssueRepository::monthly_counts(pool, ids.as_deref())
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(fill_monthly_series(&rows)))
}

/// Expand sparse per-month counts into contiguous series per DBMS.
fn fill_monthly_series(rows: &[MonthlyCountRow]) -> BTreeMap<String, Vec<MonthlyPoint>> {
    let mut series: BTreeMap<String, Vec<MonthlyPoint>> = BTreeMap::new();
    if rows.is_empty() {
        return series;
    }

    // Rows come back ordered by month, so the range is first..=last.
    let start = &rows[0].month;
    let end = &rows[rows.len() - 1].month;
    let months = month_range(start, end);

    for row in rows {
        series.entry(row.dbms.clone()).or_insert_with(|| {
            months
                .iter()
                .map(|month| MonthlyPoint {
                    month: month.clone(),
                    total_bugs: 0,
                })
                .collect()
        });
    }

    for row in rows {
        if let Some(points) = series.get_mut(&row.dbms) {
            if let Some(point) = points.iter_mut().find(|point| point.month == row.month) {
                point.total_bugs = row.total_bugs;
            }
        }
    }

    series
}

/// All "YYYY-MM" months from `start` to `end` inclusive. Returns just the
/// endpoints when either fails to parse.
fn month_range(start: &str, end: &str) -> Vec<String> {
    let parse = |value: &str| -> Option<(i32, u32)> {
        let (year, month) = value.split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if (1..=12).contains(&month) {
            Some((year, month))
        } else {
            None
        }
    };

    let (Some((start_year, start_month)), Some((end_year, end_month))) =
        (parse(start), parse(end))
    else {
        return vec![start.to_string(), end.to_string()];
    };

    let mut months = Vec::new();
    let (mut year, mut month) = (start_year, start_month);
    while (year, month) <= (end_year, end_month) {
        months.push(format!("{:04}-{:02}", year, month));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dbms: &str, month: &str, total_bugs: i64) -> MonthlyCountRow {
        MonthlyCountRow {
            dbms: dbms.to_string(),
            month: month.to_string(),
            total_bugs,
        }
    }

    #[test]
    fn test_month_range_spans_years() {
        assert_eq!(
            month_range("2024-11", "2025-02"),
            vec!["2024-11", "2024-12", "2025-01", "2025-02"]
        );
    }

    #[test]
    fn test_month_range_single_month() {
        assert_eq!(month_range("2025-03", "2025-03"), vec!["2025-03"]);
    }

    #[test]
    fn test_fill_monthly_series_fills_gaps() {
        let rows = vec![
            row("DuckDB", "2025-01", 2),
            row("SQLite3", "2025-01", 1),
            row("DuckDB", "2025-03", 4),
        ];

        let series = fill_monthly_series(&rows);

        let duckdb = &series["DuckDB"];
        assert_eq!(
            duckdb,
            &vec![
                MonthlyPoint { month: "2025-01".to_string(), total_bugs: 2 },
                MonthlyPoint { month: "2025-02".to_string(), total_bugs: 0 },
                MonthlyPoint { month: "2025-03".to_string(), total_bugs: 4 },
            ]
        );

        let sqlite = &series["SQLite3"];
        assert_eq!(sqlite[0].total_bugs, 1);
        assert_eq!(sqlite[1].total_bugs, 0);
        assert_eq!(sqlite[2].total_bugs, 0);
    }

    #[test]
    fn test_fill_monthly_series_empty() {
        assert!(fill_monthly_series(&[]).is_empty());
    }
}
