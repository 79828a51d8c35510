//! Session-related types.
//!
//! The visitor session carries two things: the password gate flag and the
//! currently open aside panel.

use std::time::Duration;

use flora_bella_core::{AsideKind, AsidePanel, AsideState, GateSession};
use tower_sessions::{Expiry, Session};

/// Session keys.
pub mod keys {
    /// Key for the password gate flag.
    pub const PASSWORD_ALLOWED: &str = "passwordAllowed";

    /// Key for the open aside panel.
    pub const ASIDE: &str = "aside";
}

/// A visitor's HTTP session seen through the gate's session interface.
#[derive(Debug, Clone, Copy)]
pub struct VisitorSession<'a>(pub &'a Session);

impl GateSession for VisitorSession<'_> {
    type Error = tower_sessions::session::Error;

    async fn get_password_allowed(&self) -> Result<Option<bool>, Self::Error> {
        self.0.get::<bool>(keys::PASSWORD_ALLOWED).await
    }

    async fn set_password_allowed(&self, allowed: bool) -> Result<(), Self::Error> {
        self.0.insert(keys::PASSWORD_ALLOWED, allowed).await
    }

    async fn unset_password_allowed(&self) -> Result<(), Self::Error> {
        self.0.remove::<bool>(keys::PASSWORD_ALLOWED).await?;
        Ok(())
    }

    async fn commit(&self, max_age: Option<Duration>) -> Result<(), Self::Error> {
        if let Some(max_age) = max_age {
            let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
            self.0.set_expiry(Some(Expiry::OnInactivity(
                tower_sessions::cookie::time::Duration::seconds(seconds),
            )));
        }
        self.0.save().await
    }
}

impl VisitorSession<'_> {
    /// Read the open aside. Unreadable state reads as closed.
    pub async fn aside(&self) -> AsideState {
        self.0
            .get::<AsideState>(keys::ASIDE)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Store the open aside.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_aside(&self, aside: AsideState) -> Result<(), tower_sessions::session::Error> {
        self.0.insert(keys::ASIDE, aside).await
    }
}

/// Aside panel that collects open requests during a synchronous handler
/// run, to be written to the session afterwards.
#[derive(Debug, Default)]
pub struct PendingAside {
    opened: Option<AsideKind>,
}

impl PendingAside {
    /// The panel opened last, if any.
    #[must_use]
    pub const fn opened(&self) -> Option<AsideKind> {
        self.opened
    }

    /// Write the collected state to `session`. No-op when nothing was opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn persist(&self, session: VisitorSession<'_>) -> Result<(), tower_sessions::session::Error> {
        match self.opened {
            Some(kind) => session.set_aside(AsideState::opened(kind)).await,
            None => Ok(()),
        }
    }
}

impl AsidePanel for PendingAside {
    fn open(&mut self, kind: AsideKind) {
        self.opened = Some(kind);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use flora_bella_core::PasswordGate;
    use secrecy::SecretString;

    use super::*;
    use crate::middleware::CacheSessionStore;

    fn session() -> Session {
        Session::new(None, Arc::new(CacheSessionStore::default()), None)
    }

    #[tokio::test]
    async fn test_gate_flag_round_trips_through_session() {
        let session = session();
        let visitor = VisitorSession(&session);
        assert!(!PasswordGate::check_access(&visitor).await);

        let gate = PasswordGate::new(Some(SecretString::from("bloom")), None);
        gate.submit_password(&visitor, "bloom").await.unwrap();

        assert_eq!(
            session.get::<bool>(keys::PASSWORD_ALLOWED).await.unwrap(),
            Some(true)
        );
        assert!(PasswordGate::check_access(&visitor).await);

        gate.logout(&visitor).await.unwrap();
        assert!(!PasswordGate::check_access(&visitor).await);
    }

    #[tokio::test]
    async fn test_commit_applies_max_age() {
        let session = session();
        let visitor = VisitorSession(&session);
        visitor.set_password_allowed(true).await.unwrap();
        visitor
            .commit(Some(Duration::from_secs(15 * 60)))
            .await
            .unwrap();

        assert!(matches!(
            session.expiry(),
            Some(Expiry::OnInactivity(max_age)) if max_age.whole_seconds() == 900
        ));
    }

    #[tokio::test]
    async fn test_commit_without_max_age_keeps_expiry() {
        let session = session();
        let visitor = VisitorSession(&session);
        visitor.set_password_allowed(true).await.unwrap();
        visitor.commit(None).await.unwrap();
        assert!(session.expiry().is_none());
    }

    #[tokio::test]
    async fn test_pending_aside_persists_last_opened() {
        let session = session();
        let mut pending = PendingAside::default();
        pending.open(AsideKind::Search);
        pending.open(AsideKind::Cart);

        pending.persist(VisitorSession(&session)).await.unwrap();

        let aside = VisitorSession(&session).aside().await;
        assert!(aside.is_open(AsideKind::Cart));
    }

    #[tokio::test]
    async fn test_pending_aside_without_open_leaves_session_alone() {
        let session = session();
        PendingAside::default()
            .persist(VisitorSession(&session))
            .await
            .unwrap();
        assert_eq!(VisitorSession(&session).aside().await, AsideState::default());
    }
}
