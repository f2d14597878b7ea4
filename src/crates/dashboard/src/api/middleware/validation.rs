//! Request validation helpers

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Dbms, IssueStatus, TestOracle};

/// Validate a DBMS value against the supported list
pub fn validate_dbms(value: &str) -> ApiResult<()> {
    if !Dbms::is_valid(value) {
        return Err(ApiError::ValidationError(format!(
            "Invalid dbms: {}",
            value
        )));
    }
    Ok(())
}

/// Validate a test oracle value against the supported list
pub fn validate_oracle(value: &str) -> ApiResult<()> {
    if !TestOracle::is_valid(value) {
        return Err(ApiError::ValidationError(format!(
            "Invalid oracle: {}",
            value
        )));
    }
    Ok(())
}

/// Validate a status value against the fixed enumeration
pub fn validate_status(value: &str) -> ApiResult<()> {
    if !IssueStatus::is_valid(value) {
        return Err(ApiError::ValidationError(format!(
            "Invalid status: {}",
            value
        )));
    }
    Ok(())
}

/// Validate that a bulk operation names at least one id
pub fn validate_ids_not_empty(ids: &[i64]) -> ApiResult<()> {
    if ids.is_empty() {
        return Err(ApiError::ValidationError(
            "ids cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Parse a comma-separated id list ("1,2,3") from a query parameter
pub fn parse_id_list(raw: &str) -> ApiResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", part)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dbms() {
        assert!(validate_dbms("SQLite3").is_ok());
        assert!(validate_dbms("N/A").is_ok());
        assert!(validate_dbms("Oracle").is_err());
    }

    #[test]
    fn test_validate_oracle() {
        assert!(validate_oracle("TLP (WHERE)").is_ok());
        assert!(validate_oracle("TLP").is_err());
    }

    #[test]
    fn test_validate_status() {
        assert!(validate_status("Not a bug").is_ok());
        assert!(validate_status("open").is_err());
    }

    #[test]
    fn test_validate_ids_not_empty() {
        assert!(validate_ids_not_empty(&[1]).is_ok());
        assert!(validate_ids_not_empty(&[]).is_err());
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert!(parse_id_list("1,x").is_err());
        assert!(parse_id_list("").unwrap().is_empty());
    }
}
