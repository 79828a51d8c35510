//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame denial, no-store)
//! 5. Session layer (tower-sessions, signed cookie)
//! 6. Password gate (redirect locked visitors to `/password`)
//! 7. Cart return (consume `cart_return=true`, open the cart aside)

pub mod cart_return;
pub mod gate;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_store;

pub use cart_return::cart_return_middleware;
pub use gate::{PASSWORD_PATH, password_gate_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, with_session_layer};
pub use session_store::CacheSessionStore;
