//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::NaiveDate;
use tower_sessions::Session;
use tracing::instrument;

use super::NavView;
use crate::content::PRIVACY_POLICY;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub nav: NavView,
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
async fn serve_content_page(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    slug: &str,
) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        nav: NavView::load(session, user).await?,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    })
}

/// Display the Privacy Policy page.
///
/// # Route
///
/// `GET /privacy-policy`
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip_all)]
pub async fn privacy_policy(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<ContentPageTemplate> {
    serve_content_page(&state, &session, user.as_ref(), PRIVACY_POLICY).await
}
