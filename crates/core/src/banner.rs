//! Auto-dismissing error banner.
//!
//! A rejected password shows a banner that hides itself after
//! [`DISMISS_AFTER`]. Each new rejection cancels the pending dismissal and
//! schedules a fresh one, so the banner always stays up for the full period
//! after the latest failure, even when the message text is the same.
//!
//! [`ErrorBanner`] is the reference model for the lock screen's banner. The
//! storefront renders [`DISMISS_AFTER`] into the page as
//! `data-dismiss-after-ms`, and its `static/js/banner.js` applies the same
//! show, restart and dismiss rules in the browser.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::gate::GateRejection;

/// How long the banner stays visible after a rejection.
pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

/// The error banner and its pending dismissal.
///
/// Must be used inside a Tokio runtime.
#[derive(Debug)]
pub struct ErrorBanner {
    shown: Arc<Mutex<Option<GateRejection>>>,
    dismissal: Option<JoinHandle<()>>,
    ttl: Duration,
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::new(DISMISS_AFTER)
    }
}

impl ErrorBanner {
    /// Create a hidden banner that dismisses itself after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            shown: Arc::new(Mutex::new(None)),
            dismissal: None,
            ttl,
        }
    }

    /// Show `rejection`, replacing any pending dismissal.
    pub fn show(&mut self, rejection: GateRejection) {
        self.cancel_dismissal();

        let stamp = rejection.timestamp;
        *self.lock() = Some(rejection);

        let shown = Arc::clone(&self.shown);
        let ttl = self.ttl;
        self.dismissal = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut current = shown.lock().unwrap_or_else(PoisonError::into_inner);
            if current.as_ref().is_some_and(|r| r.timestamp == stamp) {
                *current = None;
            }
        }));
    }

    /// Hide the banner now.
    pub fn dismiss(&mut self) {
        self.cancel_dismissal();
        *self.lock() = None;
    }

    /// The rejection currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<GateRejection> {
        self.lock().clone()
    }

    /// Whether the banner is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.lock().is_some()
    }

    fn cancel_dismissal(&mut self) {
        if let Some(handle) = self.dismissal.take() {
            handle.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<GateRejection>> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ErrorBanner {
    fn drop(&mut self) {
        self.cancel_dismissal();
    }
}
