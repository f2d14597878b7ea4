//! Issue endpoint handlers

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
use crate::db::repositories::IssueRepository;

/// List all tracked issues, newest first
///
/// GET /api/v1/issues
pub async fn list_issues(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let issues = IssueRepository::list(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(response::ok(issues))
}

/// Fetch, classify, and reconcile recently updated GitHub issues
///
/// POST /api/v1/issues/refresh
pub async fn refresh_issues(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    let pool = app_state.db.pool();
    let outcome = app_state
        .sync
        .refresh(pool)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    tracing::info!(
        "Refresh finished: {} new, {} updated",
        outcome.new_issues.len(),
        outcome.updated_issues.len()
    );
    Ok(response::ok(outcome))
}

/// Edit the classification of one issue
///
/// PUT /api/v1/issues/:id
pub async fn update_issue(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateClassificationRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    if !req.has_updates() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    req.validate()?;

    let pool = app_state.db.pool();
    let matched = IssueRepository::update_fields(
        pool,
        id,
        req.dbms.as_deref(),
        req.oracle.as_deref(),
        req.status.as_deref(),
    )
    .await
    .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if matched == 0 {
        return Err(ApiError::NotFound(format!("Issue not found: {}", id)));
    }

    tracing::info!("Updated issue: {}", id);
    Ok(response::no_content())
}

/// Delete a set of issues
///
/// DELETE /api/v1/issues
pub async fn delete_issues(
    State(app_state): State<AppState>,
    Json(req): Json<DeleteIdsRequest>,
) -> ApiResult<impl axum::response::IntoResponse> {
    validation::validate_ids_not_empty(&req.ids)?;

    let pool = app_state.db.pool();
    let removed = IssueRepository::delete_many(pool, &req.ids)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Issue(s) not found".to_string()));
    }

    tracing::info!("Deleted {} issues", removed);
    Ok(response::no_content())
}
