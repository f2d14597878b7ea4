//! Enumeration endpoints
//!
//! Static lists the frontend uses to populate filters and editors.

use crate::api::response;
use crate::domain::{Dbms, IssueStatus, TestOracle};

/// Supported DBMS values
///
/// GET /api/v1/dbms
pub async fn list_dbms() -> impl axum::response::IntoResponse {
    response::ok(serde_json::json!({ "dbms": Dbms::variants() }))
}

/// Test oracle values
///
/// GET /api/v1/oracles
pub async fn list_oracles() -> impl axum::response::IntoResponse {
    response::ok(serde_json::json!({ "oracles": TestOracle::variants() }))
}

/// Issue status values
///
/// GET /api/v1/statuses
pub async fn list_statuses() -> impl axum::response::IntoResponse {
    response::ok(serde_json::json!({ "statuses": IssueStatus::variants() }))
}
