//! Order history.
//!
//! Requires a logged-in visitor. No order source is connected, so the page
//! always shows an empty history.

use askama::Template;
use askama_web::WebTemplate;
use tower_sessions::Session;
use tracing::instrument;

use super::NavView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/history.html")]
pub struct OrderHistoryTemplate {
    pub nav: NavView,
    pub user_name: String,
}

/// Display the visitor's order history.
///
/// # Route
///
/// `GET /order-history`
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all, fields(subject = %user.subject))]
pub async fn history(
    RequireUser(user): RequireUser,
    session: Session,
) -> Result<OrderHistoryTemplate> {
    let nav = NavView::load(&session, Some(&user)).await?;

    Ok(OrderHistoryTemplate {
        nav,
        user_name: user.display_name,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_empty_history_for_user() {
        let html = OrderHistoryTemplate {
            nav: NavView {
                user_name: Some("Ada".to_string()),
                cart_count: 0,
            },
            user_name: "Ada".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Orders for Ada"));
        assert!(html.contains("You have not placed any orders yet."));
        assert!(!html.contains("<table"));
    }
}
