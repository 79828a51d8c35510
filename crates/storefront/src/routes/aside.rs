//! Aside panel route handlers.
//!
//! Panels are toggled with plain form posts; the open panel lives in the
//! session and the visitor is sent back to the page they came from.

use axum::{Form, extract::Path, response::Redirect};
use flora_bella_core::cart_return::is_local_path;
use flora_bella_core::{AsideKind, AsideState};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::models::VisitorSession;

/// Aside form data.
#[derive(Debug, Deserialize)]
pub struct AsideForm {
    /// Page to return to after the change.
    pub return_to: Option<String>,
}

/// Which panels a page renders open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsideView {
    pub cart: bool,
    pub mobile_menu: bool,
    pub search: bool,
}

impl From<AsideState> for AsideView {
    fn from(state: AsideState) -> Self {
        Self {
            cart: state.is_open(AsideKind::Cart),
            mobile_menu: state.is_open(AsideKind::MobileMenu),
            search: state.is_open(AsideKind::Search),
        }
    }
}

/// Only local paths; anything else goes home.
fn safe_return_to(return_to: Option<&str>) -> &str {
    return_to.filter(|path| is_local_path(path)).unwrap_or("/")
}

/// Toggle the named panel.
pub async fn toggle(
    session: Session,
    Path(kind): Path<String>,
    Form(form): Form<AsideForm>,
) -> Result<Redirect> {
    let kind: AsideKind = kind.parse()?;
    let visitor = VisitorSession(&session);

    let mut aside = visitor.aside().await;
    aside.toggle(kind);
    visitor.set_aside(aside).await?;

    Ok(Redirect::to(safe_return_to(form.return_to.as_deref())))
}

/// Close whatever panel is open.
pub async fn close(session: Session, Form(form): Form<AsideForm>) -> Result<Redirect> {
    let visitor = VisitorSession(&session);

    let mut aside = visitor.aside().await;
    aside.close();
    visitor.set_aside(aside).await?;

    Ok(Redirect::to(safe_return_to(form.return_to.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/")), "/");
        assert_eq!(safe_return_to(Some("/search?q=rose")), "/search?q=rose");
        assert_eq!(safe_return_to(Some("//evil.example")), "/");
        assert_eq!(safe_return_to(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_to(Some("https://evil.example")), "/");
        assert_eq!(safe_return_to(None), "/");
    }

    #[test]
    fn test_view_marks_only_open_panel() {
        let view = AsideView::from(AsideState::opened(AsideKind::Cart));
        assert_eq!(
            view,
            AsideView {
                cart: true,
                mobile_menu: false,
                search: false,
            }
        );
        assert_eq!(AsideView::from(AsideState::default()), AsideView::default());
    }
}
