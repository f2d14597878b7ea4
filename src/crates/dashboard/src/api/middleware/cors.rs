//! CORS middleware configuration
//!
//! The browser dashboard is served from a different origin than the API,
//! so cross-origin requests are allowed.

use tower_http::cors::CorsLayer;

/// Create the CORS layer for the API
pub fn cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
