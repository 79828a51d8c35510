//! Session middleware configuration.
//!
//! Sessions live in a bounded in-process store ([`CacheSessionStore`]); the
//! cookie carries only the signed session id.

use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, SessionManagerLayer};

use super::session_store::CacheSessionStore;
use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fb_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the 64-byte cookie signing key from the configured secret.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Wrap `router` in the session layer.
///
/// Cookies are signed, `HttpOnly`, `SameSite=Lax`, scoped to `/`, and
/// `Secure` when the storefront is served over HTTPS.
pub fn with_session_layer<S>(router: Router<S>, config: &StorefrontConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let layer = SessionManagerLayer::new(CacheSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret));

    router.layer(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_deterministic() {
        let secret = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6");
        assert_eq!(
            signing_key(&secret).master(),
            signing_key(&secret).master()
        );
    }

    #[test]
    fn test_signing_key_depends_on_secret() {
        let a = signing_key(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"));
        let b = signing_key(&SecretString::from("zC6^uW4*rT0&pQ7#nL5@mK2!xY9$aB3"));
        assert_ne!(a.master(), b.master());
    }
}
