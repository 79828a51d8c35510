//! Application state shared across handlers.

use std::sync::Arc;

use flora_bella_core::PasswordGate;

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Sessions are not part of the
/// state; handlers get them per request from the session layer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gate: PasswordGate,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let gate = config.gate.password_gate();

        Self {
            inner: Arc::new(AppStateInner { config, gate }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the password gate.
    #[must_use]
    pub fn gate(&self) -> &PasswordGate {
        &self.inner.gate
    }
}
