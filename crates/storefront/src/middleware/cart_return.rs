//! Cart-return middleware.
//!
//! Runs the cart-return handler on every `GET`. When the checkout marker is
//! present the cart aside is opened in the session and the browser is sent
//! to the scrubbed URL with `303 See Other`, which replaces the marked URL
//! instead of adding a history entry for it.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use flora_bella_core::{CartReturn, Navigator};
use tower_sessions::Session;

use crate::models::{PendingAside, VisitorSession};

/// Navigator that answers with a redirect.
#[derive(Debug, Default)]
struct RedirectNavigator {
    location: Option<String>,
}

impl Navigator for RedirectNavigator {
    fn replace(&mut self, url: &str) {
        self.location = Some(url.to_string());
    }
}

/// Consume the `cart_return=true` marker.
///
/// Must run inside the session layer; without a session the marker is left
/// untouched. Paths that are not local (`//host/...`) are never redirected
/// and fall through to routing.
pub async fn cart_return_middleware(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let session = request.extensions().get::<Session>().cloned();
    let mut panel = session.as_ref().map(|_| PendingAside::default());
    let mut navigator = RedirectNavigator::default();

    let uri = request.uri();
    let outcome = CartReturn::handle(uri.path(), uri.query(), panel.as_mut(), &mut navigator);
    if !outcome.is_consumed() {
        return next.run(request).await;
    }

    if let (Some(session), Some(panel)) = (session.as_ref(), panel.as_ref()) {
        if let Err(e) = panel.persist(VisitorSession(session)).await {
            tracing::warn!("Failed to open cart aside after checkout return: {}", e);
        }
    }

    match navigator.location {
        Some(location) => {
            tracing::debug!(%location, "Consumed cart return marker");
            Redirect::to(&location).into_response()
        }
        None => next.run(request).await,
    }
}
