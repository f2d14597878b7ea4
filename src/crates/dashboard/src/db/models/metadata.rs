//! Key/value metadata model
//!
//! Currently holds a single key of interest, `latest_updated_at`: the
//! watermark bounding incremental GitHub re-fetches.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Metadata {
    pub key: String,
    pub value: String,
}

/// Metadata key for the refresh watermark.
pub const LATEST_UPDATED_AT: &str = "latest_updated_at";
