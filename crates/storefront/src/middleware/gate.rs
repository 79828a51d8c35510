//! Password gate enforcement.
//!
//! When the store is locked, every request outside the exempt paths needs
//! an unlocked session; anything else is sent to the lock screen.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use flora_bella_core::PasswordGate;
use tower_sessions::Session;

use crate::models::VisitorSession;
use crate::state::AppState;

/// Path of the lock screen.
pub const PASSWORD_PATH: &str = "/password";

/// Paths reachable without unlocking the store.
fn is_exempt(path: &str) -> bool {
    path == PASSWORD_PATH || path == "/health" || path.starts_with("/static/")
}

/// Redirect locked visitors to [`PASSWORD_PATH`].
///
/// Must run inside the session layer. A missing session keeps the store
/// locked.
pub async fn password_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config().gate.enforced() || is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(session) = request.extensions().get::<Session>().cloned() else {
        tracing::warn!("Session missing from request extensions - session layer may be misconfigured");
        return Redirect::to(PASSWORD_PATH).into_response();
    };

    if PasswordGate::check_access(&VisitorSession(&session)).await {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Store locked, redirecting to password page");
    Redirect::to(PASSWORD_PATH).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt("/password"));
        assert!(is_exempt("/health"));
        assert!(is_exempt("/static/css/main.css"));
    }

    #[test]
    fn test_gated_paths() {
        assert!(!is_exempt("/"));
        assert!(!is_exempt("/password2"));
        assert!(!is_exempt("/static"));
        assert!(!is_exempt("/aside/cart/toggle"));
    }
}
