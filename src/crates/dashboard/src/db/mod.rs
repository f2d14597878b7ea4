//! Database module for the dashboard
//!
//! Provides database connectivity, models, repositories, and error handling
//! for persistent storage of issues, bug reports, and sync metadata.

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{DatabaseConnection, DatabasePool};
pub use error::{DatabaseError, DbResult};
