//! Backend for the SQLancer bug dashboard.
//!
//! Polls GitHub for issues mentioning SQLancer, classifies each issue with a
//! hosted language model into structured fields (DBMS, test oracle, status),
//! reconciles the batch against previously stored rows, and serves a JSON
//! HTTP API consumed by the browser dashboard.

pub mod api;
pub mod classify;
pub mod config;
pub mod db;
pub mod domain;
pub mod github;
pub mod sync;
