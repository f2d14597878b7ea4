//! Bug report endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{
    error::{ApiError, ApiResult},
    middleware::validation,
    models::{DeleteIdsRequest, UpdateClassificationRequest},
    response,
    routes::AppState,
};
use crate::db::repositories::BugReportRepository;

/// List all imported SQLancer bug reports, newest first
///
/// GET /api/v1/bug-reports
pub async fn list_bug_reports(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let reports = BugReportRepository::list(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(reports))
}

/// Edit the classification of one bug report
///
/// PUT /api/v1/bug-reports/:id
pub async fn update_bug_report(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateClassificationRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if !req.has_updates() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    req.validate()?;

    let pool = app_state.db.pool();
    let matched = BugReportRepository::update_fields(
        pool,
        id,
        req.dbms.as_deref(),
        req.oracle.as_deref(),
        req.status.as_deref(),
    )
    .await
    .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if matched == 0 {
        return Err(ApiError::NotFound(format!("Bug report not found: {}", id)));
    }

    tracing::info!("Updated bug report: {}", id);
    Ok(response::no_content())
}

/// Delete a set of bug reports
///
/// DELETE /api/v1/bug-reports
pub async fn delete_bug_reports(
    State(app_state): State<AppState>,
    Json(req): Json<DeleteIdsRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validation::validate_ids_not_empty(&req.ids)?;

    let pool = app_state.db.pool();
    let removed = BugReportRepository::delete_many(pool, &req.ids)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Bug report(s) not found".to_string()));
    }

    tracing::info!("Deleted {} bug reports", removed);
    Ok(response::no_content())
}
