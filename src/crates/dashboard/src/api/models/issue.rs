//! Issue and bug report API models

use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::middleware::validation;

/// Request to edit the classification of an issue or bug report.
///
/// All fields are optional; unset fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClassificationRequest {
    /// Updated DBMS (optional)
    pub dbms: Option<String>,

    /// Updated test oracle (optional)
    pub oracle: Option<String>,

    /// Updated status (optional)
    pub status: Option<String>,
}

impl UpdateClassificationRequest {
    /// Check if any fields are being updated
    pub fn has_updates(&self) -> bool {
        self.dbms.is_some() || self.oracle.is_some() || self.status.is_some()
    }

    /// Validate every provided field against its enumeration
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(ref dbms) = self.dbms {
            validation::validate_dbms(dbms)?;
        }
        if let Some(ref oracle) = self.oracle {
            validation::validate_oracle(oracle)?;
        }
        if let Some(ref status) = self.status {
            validation::validate_status(status)?;
        }
        Ok(())
    }
}

/// Request body for bulk deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIdsRequest {
    pub ids: Vec<i64>,
}

/// Query parameters for the monthly summary.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyQuery {
    /// Comma-separated row ids restricting the series (optional)
    pub ids: Option<String>,
}
