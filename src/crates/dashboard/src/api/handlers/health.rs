//! Health check endpoint handler

use axum::extract::State;

use crate::api::{
    error::{ApiError, ApiResult},
    response,
    routes::AppState,
};

/// Liveness check including database connectivity
///
/// GET /health
pub async fn health(
    State(app_state): State<AppState>,
) -> ApiResult<impl axum::response::IntoResponse> {
    app_state
        .db
        .health_check()
        .await
        .map_err(|e| ApiError::InternalError(format!("database unreachable: {}", e)))?;

    Ok(response::ok(serde_json::json!({ "status": "ok" })))
}
