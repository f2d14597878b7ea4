//! API route definitions
//!
//! Defines all API routes and their associated handler functions.

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::api::{handlers, middleware};
use crate::db::DatabaseConnection;
use crate::sync::SyncService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sync: Arc<SyncService>,
}

/// Build the complete API router
pub fn create_router(db: DatabaseConnection, sync: Arc<SyncService>) -> Router {
    let app_state = AppState { db, sync };

    Router::new()
        // Health check endpoint
        .route("/health", get(handlers::health))
        // Enumeration endpoints
        .route("/api/v1/dbms", get(handlers::list_dbms))
        .route("/api/v1/oracles", get(handlers::list_oracles))
        .route("/api/v1/statuses", get(handlers::list_statuses))
        // Issue endpoints
        .route(
            "/api/v1/issues",
            get(handlers::list_issues).delete(handlers::delete_issues),
        )
        .route("/api/v1/issues/refresh", axum::routing::post(handlers::refresh_issues))
        .route("/api/v1/issues/:id", put(handlers::update_issue))
        // Bug report endpoints
        .route(
            "/api/v1/bug-reports",
            get(handlers::list_bug_reports).delete(handlers::delete_bug_reports),
        )
        .route("/api/v1/bug-reports/:id", put(handlers::update_bug_report))
        // Summary endpoints
        .route("/api/v1/summary/dbms", get(handlers::summary_by_dbms))
        .route("/api/v1/summary/oracles", get(handlers::summary_by_oracle))
        .route("/api/v1/summary/statuses", get(handlers::summary_by_status))
        .route("/api/v1/summary/monthly", get(handlers::summary_monthly))
        .layer(middleware::logging::logging_layer())
        .layer(middleware::cors::cors_layer())
        .with_state(app_state)
}
