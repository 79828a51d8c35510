//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::models::VisitorSession;
use crate::routes::aside::AsideView;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub messages: Vec<String>,
    pub shop_url: String,
    pub contact_url: String,
    pub current_path: &'static str,
    pub aside: AsideView,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> HomeTemplate {
    let aside = AsideView::from(VisitorSession(&session).aside().await);
    let store = &state.config().store;

    HomeTemplate {
        messages: store.messages.clone(),
        shop_url: store.shop_url.clone(),
        contact_url: store.contact_url.clone(),
        current_path: "/",
        aside,
    }
}
