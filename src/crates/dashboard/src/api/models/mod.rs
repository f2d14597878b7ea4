//! API request models and DTOs.

pub mod issue;

pub use issue::{DeleteIdsRequest, MonthlyQuery, UpdateClassificationRequest};
