//! Store-wide password gate.
//!
//! Every visitor session is either [`GateState::Locked`] (the initial state)
//! or [`GateState::Unlocked`]. The only stored state is a single boolean flag
//! in the visitor's session:
//!
//! ```text
//! LOCKED   --submit_password(correct)-->   UNLOCKED
//! LOCKED   --submit_password(incorrect)--> LOCKED    (rejection)
//! UNLOCKED --logout-->                     LOCKED
//! UNLOCKED --session cookie expiry-->      LOCKED
//! ```
//!
//! Submissions are not throttled and there is no lockout after repeated
//! failures.

use core::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Path visitors are sent to after unlocking or locking the store.
pub const HOME_PATH: &str = "/";

/// Message shown when the submitted password does not match.
pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect password, try again.";

/// Max-age applied to the session cookie when the gate flag is committed.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// Session storage for the gate flag.
///
/// Implemented by the storefront over its HTTP session, and by in-memory
/// fakes in tests. Writes are not visible to the client until [`commit`]
/// is called.
///
/// [`commit`]: GateSession::commit
pub trait GateSession: Send + Sync {
    /// Error raised by the underlying session store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the flag. `None` when it was never set.
    fn get_password_allowed(&self)
    -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send;

    /// Write the flag.
    fn set_password_allowed(&self, allowed: bool)
    -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove the flag.
    fn unset_password_allowed(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Persist the session and re-issue its cookie.
    ///
    /// `max_age` overrides the cookie lifetime for this commit; `None` keeps
    /// the store's default.
    fn commit(&self, max_age: Option<Duration>)
    -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Access state of a visitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Flag absent or false. Storefront pages are blocked.
    Locked,
    /// Flag set. Storefront pages render normally.
    Unlocked,
}

impl GateState {
    /// Map a stored flag to a state. Absence is `Locked`.
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Self::Unlocked,
            Some(false) | None => Self::Locked,
        }
    }

    /// Whether the visitor may see the storefront.
    #[must_use]
    pub const fn is_unlocked(self) -> bool {
        matches!(self, Self::Unlocked)
    }
}

/// A failed password submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRejection {
    /// User-facing message.
    pub message: &'static str,
    /// Milliseconds since the Unix epoch, strictly increasing across
    /// rejections so a repeated message still re-triggers the banner.
    pub timestamp: i64,
}

/// Result of a gate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session committed; send the visitor to [`HOME_PATH`].
    RedirectHome,
    /// Wrong password; the session was not touched.
    Rejected(GateRejection),
}

impl GateOutcome {
    /// Redirect target, if the outcome is a redirect.
    #[must_use]
    pub const fn location(&self) -> Option<&'static str> {
        match self {
            Self::RedirectHome => Some(HOME_PATH),
            Self::Rejected(_) => None,
        }
    }
}

/// The password gate: the expected secret plus the cookie max-age used on
/// every commit.
#[derive(Clone)]
pub struct PasswordGate {
    secret: Option<SecretString>,
    max_age: Option<Duration>,
}

impl fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGate")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl PasswordGate {
    /// Create a gate.
    ///
    /// A gate without a secret rejects every submission.
    #[must_use]
    pub const fn new(secret: Option<SecretString>, max_age: Option<Duration>) -> Self {
        Self { secret, max_age }
    }

    /// Whether an expected secret is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Cookie max-age applied on commit.
    #[must_use]
    pub const fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Read the session's access state.
    ///
    /// Never fails: an unreadable session is treated as locked.
    pub async fn state<S: GateSession>(session: &S) -> GateState {
        GateState::from_flag(session.get_password_allowed().await.ok().flatten())
    }

    /// Whether the session may see the storefront.
    pub async fn check_access<S: GateSession>(session: &S) -> bool {
        Self::state(session).await.is_unlocked()
    }

    /// Compare `candidate` with the expected secret.
    ///
    /// On a match the flag is set and the session committed. On a mismatch
    /// the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the session store's error if writing or committing fails.
    pub async fn submit_password<S: GateSession>(
        &self,
        session: &S,
        candidate: &str,
    ) -> Result<GateOutcome, S::Error> {
        if !self.matches(candidate) {
            return Ok(GateOutcome::Rejected(GateRejection {
                message: INCORRECT_PASSWORD_MESSAGE,
                timestamp: next_rejection_timestamp(),
            }));
        }

        session.set_password_allowed(true).await?;
        session.commit(self.max_age).await?;
        Ok(GateOutcome::RedirectHome)
    }

    /// Clear the flag and commit, re-applying the max-age so the cleared
    /// session still expires normally.
    ///
    /// # Errors
    ///
    /// Returns the session store's error if writing or committing fails.
    pub async fn logout<S: GateSession>(&self, session: &S) -> Result<GateOutcome, S::Error> {
        session.unset_password_allowed().await?;
        session.commit(self.max_age).await?;
        Ok(GateOutcome::RedirectHome)
    }

    fn matches(&self, candidate: &str) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|secret| constant_time_compare(candidate, secret.expose_secret()))
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

static LAST_REJECTION: AtomicI64 = AtomicI64::new(0);

/// Wall-clock milliseconds, bumped past the previous value when the clock
/// has not advanced (or went backwards).
fn next_rejection_timestamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let previous = LAST_REJECTION
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    now.max(previous.saturating_add(1))
}
