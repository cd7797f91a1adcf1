//! Login and logout through the identity provider.
//!
//! - Login: redirects to the provider's authorization page
//! - Callback: checks state, exchanges the code, fetches the profile and
//!   records the visitor in the session
//! - Logout: forgets the visitor and sends them through the provider's logout
//!
//! Every failure in the callback lands back on the catalog page with an
//! `auth_error` code; provider messages are logged, never shown.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Length of the generated state value.
const OAUTH_TOKEN_LENGTH: usize = 32;

/// Query parameters from the identity provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a random alphanumeric string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&byte| char::from(byte))
        .collect()
}

/// Redirect to the catalog page with a login failure code.
fn auth_failure(code: &str) -> Response {
    Redirect::to(&format!("/?auth_error={code}")).into_response()
}

/// Start login.
///
/// Stores a fresh state value in the session and redirects to the
/// provider's authorization page.
///
/// # Route
///
/// `GET /auth/login`
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let oauth_state = generate_random_string(OAUTH_TOKEN_LENGTH);

    session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await?;

    let auth_url = state
        .identity()
        .authorization_url(&state.auth_callback_url(), &oauth_state);

    Ok(Redirect::to(&auth_url))
}

/// Handle the login callback.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(%error, %description, "Identity provider returned an error");
        return auth_failure("access_denied");
    }

    let Some(code) = query.code else {
        tracing::warn!("Login callback missing code");
        return auth_failure("missing_code");
    };

    let Some(returned_state) = query.state else {
        tracing::warn!("Login callback missing state");
        return auth_failure("missing_state");
    };

    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Login state mismatch");
        return auth_failure("invalid_state");
    }

    let token = match state
        .identity()
        .exchange_code(&code, &state.auth_callback_url())
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange authorization code");
            return auth_failure("token_exchange");
        }
    };

    let info = match state.identity().user_info(&token.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch user info");
            return auth_failure("user_info");
        }
    };

    let user = CurrentUser::from_login(&info, &token);

    // New identity, new session id.
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to rotate session id");
        return auth_failure("session");
    }
    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!(error = %e, "Failed to store user in session");
        return auth_failure("session");
    }

    set_sentry_user(&user.subject, user.email.as_deref());
    tracing::info!(subject = %user.subject, "User logged in");

    Redirect::to("/").into_response()
}

/// Log out.
///
/// Forgets the visitor (the cart stays) and redirects through the
/// provider's logout endpoint back to the catalog page.
///
/// # Route
///
/// `POST /auth/logout`
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    let return_to = format!("{}/", state.config().base_url);
    Ok(Redirect::to(&state.identity().logout_url(&return_to)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string() {
        let a = generate_random_string(32);
        let b = generate_random_string(32);

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_auth_failure_redirect() {
        let response = auth_failure("invalid_state");
        assert_eq!(response.headers()["location"], "/?auth_error=invalid_state");
    }
}
