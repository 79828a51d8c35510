//! Lock screen route handlers.
//!
//! `GET /password` shows the lock screen (or "Access Granted" for an
//! unlocked session). `POST /password` either checks the submitted password
//! or, with `_action=logout`, locks the session again.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use flora_bella_core::banner::DISMISS_AFTER;
use flora_bella_core::gate::HOME_PATH;
use flora_bella_core::{Countdown, GateOutcome, GateRejection, PasswordGate};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::VisitorSession;
use crate::state::AppState;

/// `_action` value that locks the store again.
pub const LOGOUT_ACTION: &str = "logout";

// =============================================================================
// Form Types
// =============================================================================

/// Lock screen form data.
///
/// Implements `Debug` manually so the candidate password never reaches logs.
#[derive(Deserialize)]
pub struct PasswordForm {
    pub password: Option<String>,
    #[serde(rename = "_action")]
    pub action: Option<String>,
}

impl std::fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordForm")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("action", &self.action)
            .finish()
    }
}

impl PasswordForm {
    fn is_logout(&self) -> bool {
        self.action.as_deref() == Some(LOGOUT_ACTION)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// One countdown box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownUnit {
    pub value: String,
    pub label: &'static str,
}

/// Lock screen template.
#[derive(Template, WebTemplate)]
#[template(path = "password.html")]
pub struct PasswordTemplate {
    pub unlocked: bool,
    pub countdown: Vec<CountdownUnit>,
    pub error: Option<GateRejection>,
    pub dismiss_after_ms: u128,
}

impl PasswordTemplate {
    fn new(state: &AppState, unlocked: bool, error: Option<GateRejection>) -> Self {
        Self {
            unlocked,
            countdown: countdown_units(state),
            error,
            dismiss_after_ms: DISMISS_AFTER.as_millis(),
        }
    }
}

/// Countdown to the configured launch; empty once launched or when unset.
fn countdown_units(state: &AppState) -> Vec<CountdownUnit> {
    let Some(launch_at) = state.config().gate.launch_at else {
        return Vec::new();
    };

    let countdown = Countdown::until(launch_at);
    if countdown.is_expired() {
        return Vec::new();
    }

    countdown
        .units()
        .into_iter()
        .map(|(value, label)| CountdownUnit { value, label })
        .collect()
}

// =============================================================================
// Routes
// =============================================================================

/// Display the lock screen.
pub async fn show(State(state): State<AppState>, session: Session) -> PasswordTemplate {
    let unlocked = PasswordGate::check_access(&VisitorSession(&session)).await;
    PasswordTemplate::new(&state, unlocked, None)
}

/// Handle a lock screen submission.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PasswordForm>,
) -> Result<Response> {
    let visitor = VisitorSession(&session);
    let gate = state.gate();

    if form.is_logout() {
        gate.logout(&visitor).await?;
        tracing::info!("Store locked again");
        add_breadcrumb("gate", "Store locked", None);
        return Ok(Redirect::to(HOME_PATH).into_response());
    }

    let candidate = form.password.as_deref().unwrap_or_default();
    match gate.submit_password(&visitor, candidate).await? {
        GateOutcome::RedirectHome => {
            tracing::info!("Store unlocked");
            add_breadcrumb("gate", "Store unlocked", None);
            Ok(Redirect::to(HOME_PATH).into_response())
        }
        GateOutcome::Rejected(rejection) => {
            if !gate.is_configured() {
                tracing::warn!("Password submitted but no store password is configured");
            }
            tracing::info!(timestamp = rejection.timestamp, "Incorrect store password");
            add_breadcrumb("gate", "Incorrect store password", None);

            let unlocked = PasswordGate::check_access(&visitor).await;
            Ok(PasswordTemplate::new(&state, unlocked, Some(rejection)).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logout_action_detection() {
        let form = PasswordForm {
            password: None,
            action: Some("logout".to_string()),
        };
        assert!(form.is_logout());

        let form = PasswordForm {
            password: Some("bloom".to_string()),
            action: None,
        };
        assert!(!form.is_logout());
    }

    #[test]
    fn test_form_debug_redacts_password() {
        let form = PasswordForm {
            password: Some("bloom".to_string()),
            action: None,
        };
        let debug = format!("{form:?}");
        assert!(!debug.contains("bloom"));
        assert!(debug.contains("[REDACTED]"));
    }
}
