//! API endpoint handlers.

pub mod bug_reports;
pub mod enums;
pub mod health;
pub mod issues;
pub mod summary;

pub use bug_reports::{delete_bug_reports, list_bug_reports, update_bug_report};
pub use enums::{list_dbms, list_oracles, list_statuses};
pub use health::health;
pub use issues::{delete_issues, list_issues, refresh_issues, update_issue};
pub use summary::{summary_by_dbms, summary_by_oracle, summary_by_status, summary_monthly};
