//! Authentication extractors.
//!
//! The rest of the storefront only asks two questions: is the visitor logged
//! in, and what is their name. Both are answered from the session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in visitor.
///
/// Anyone else is sent back to the catalog page.
///
/// # Example
///
/// ```rust,ignore
/// async fn order_history(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Orders for {}", user.display_name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Rejection returned by [`RequireUser`].
#[derive(Debug)]
pub enum AuthRejection {
    /// Visitor is not logged in; send them to the catalog.
    RedirectHome,
    /// The session layer is missing from the router.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::MissingSession => {
                tracing::error!("Session extension missing; is the session layer installed?");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        current_user(session)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectHome)
    }
}

/// Extractor that optionally gets the logged-in visitor.
///
/// Never rejects; a missing session reads as logged out.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Read the logged-in visitor, dropping the login if it has expired.
async fn current_user(session: &Session) -> Option<CurrentUser> {
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if user.is_expired() {
        tracing::debug!(subject = %user.subject, "Login expired");
        if let Err(e) = clear_current_user(session).await {
            tracing::warn!(error = %e, "Failed to clear expired login");
        }
        return None;
    }

    Some(user)
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user(expires_at: Option<i64>) -> CurrentUser {
        CurrentUser {
            subject: "auth0|1".to_string(),
            display_name: "Ada".to_string(),
            email: None,
            expires_at,
        }
    }

    fn parts_with(session: Option<Session>) -> Parts {
        let (mut parts, ()) = Request::builder()
            .uri("/order-history")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        parts
    }

    #[tokio::test]
    async fn test_require_user_redirects_when_logged_out() {
        let mut parts = parts_with(Some(session()));
        let rejection = RequireUser::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectHome));

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[tokio::test]
    async fn test_require_user_accepts_logged_in() {
        let session = session();
        set_current_user(&session, &user(None)).await.unwrap();

        let mut parts = parts_with(Some(session));
        let RequireUser(found) = RequireUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found.display_name, "Ada");
    }

    #[tokio::test]
    async fn test_expired_login_is_cleared() {
        let session = session();
        set_current_user(&session, &user(Some(1))).await.unwrap();

        let mut parts = parts_with(Some(session.clone()));
        let OptionalUser(found) = OptionalUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(found.is_none());

        let stored: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_optional_user_without_session_layer() {
        let mut parts = parts_with(None);
        let OptionalUser(found) = OptionalUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_clear_current_user() {
        let session = session();
        set_current_user(&session, &user(None)).await.unwrap();
        clear_current_user(&session).await.unwrap();

        let mut parts = parts_with(Some(session));
        assert!(
            RequireUser::from_request_parts(&mut parts, &())
                .await
                .is_err()
        );
    }
}
