//! HTTP API module
//!
//! Routes, handlers, request/response models, middleware, and error
//! conversion for the JSON API consumed by the browser dashboard.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiResult};
