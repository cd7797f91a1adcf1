//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::identity::{IdentityToken, UserInfo};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in visitor.
/// Provider tokens are not kept; the profile is all the views need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Subject identifier at the identity provider.
    pub subject: String,
    /// Name shown in the navbar and on the order history page.
    pub display_name: String,
    /// Email address, if the provider shared it.
    pub email: Option<String>,
    /// Unix timestamp after which the login is no longer honoured.
    pub expires_at: Option<i64>,
}

impl CurrentUser {
    /// Build the session identity from a completed login.
    #[must_use]
    pub fn from_login(info: &UserInfo, token: &IdentityToken) -> Self {
        Self {
            subject: info.sub.clone(),
            display_name: info.display_name(),
            email: info.email.clone(),
            expires_at: token.expires_at(),
        }
    }

    /// Whether the login has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Utc::now().timestamp() >= expires_at)
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(expires_at: Option<i64>) -> CurrentUser {
        CurrentUser {
            subject: "auth0|1".to_string(),
            display_name: "Ada".to_string(),
            email: None,
            expires_at,
        }
    }

    #[test]
    fn test_from_login() {
        let info = UserInfo {
            sub: "auth0|7".to_string(),
            name: None,
            nickname: Some("ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let token = IdentityToken {
            access_token: "a".to_string(),
            id_token: None,
            expires_in: Some(60),
            obtained_at: 100,
        };

        let current = CurrentUser::from_login(&info, &token);
        assert_eq!(current.subject, "auth0|7");
        assert_eq!(current.display_name, "ada");
        assert_eq!(current.email.as_deref(), Some("ada@example.com"));
        assert_eq!(current.expires_at, Some(160));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now().timestamp();
        assert!(user(Some(now - 1)).is_expired());
        assert!(!user(Some(now + 3600)).is_expired());
        assert!(!user(None).is_expired());
    }
}
