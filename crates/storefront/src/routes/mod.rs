//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /                       - Home page
//!
//! # Password gate
//! GET  /password               - Lock screen
//! POST /password               - Unlock, or lock again with `_action=logout`
//!
//! # Aside panels
//! POST /aside/close            - Close the open aside
//! POST /aside/{kind}/toggle    - Toggle cart, mobile-menu or search
//! ```

pub mod aside;
pub mod home;
pub mod password;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the aside routes router.
pub fn aside_routes() -> Router<AppState> {
    Router::new()
        .route("/close", post(aside::close))
        .route("/{kind}/toggle", post(aside::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Home page
        .route("/", get(home::home))
        // Lock screen
        .route("/password", get(password::show).post(password::submit))
        // Aside panels
        .nest("/aside", aside_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
