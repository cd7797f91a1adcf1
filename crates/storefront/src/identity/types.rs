//! Types for identity provider token and profile responses.

use chrono::Utc;
use serde::Deserialize;

/// Tokens obtained from the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct IdentityToken {
    /// Access token for the `userinfo` endpoint.
    pub access_token: String,
    /// The ID token (`OpenID` Connect).
    pub id_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl IdentityToken {
    /// Unix timestamp after which the session should be treated as logged out.
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_in
            .map(|expires_in| self.obtained_at.saturating_add(expires_in))
    }
}

/// Raw token response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub token_type: Option<String>,
}

impl From<TokenResponse> for IdentityToken {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            id_token: response.id_token,
            expires_in: response.expires_in,
            obtained_at: Utc::now().timestamp(),
        }
    }
}

/// Profile returned by the `userinfo` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Subject identifier, unique per user at the provider.
    pub sub: String,
    /// Full name.
    pub name: Option<String>,
    /// Short name chosen by the user.
    pub nickname: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl UserInfo {
    /// Name shown in the navbar: name, nickname, email, then subject.
    #[must_use]
    pub fn display_name(&self) -> String {
        [&self.name, &self.nickname, &self.email]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or(self.sub.as_str())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: Option<&str>, nickname: Option<&str>, email: Option<&str>) -> UserInfo {
        UserInfo {
            sub: "auth0|123".to_string(),
            name: name.map(String::from),
            nickname: nickname.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_display_name_prefers_name() {
        let user = info(Some("Ada Lovelace"), Some("ada"), Some("ada@example.com"));
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_display_name_skips_blank_values() {
        let user = info(Some("  "), Some("ada"), None);
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn test_display_name_falls_back_to_subject() {
        assert_eq!(info(None, None, None).display_name(), "auth0|123");
    }

    #[test]
    fn test_expires_at() {
        let token = IdentityToken {
            access_token: "t".to_string(),
            id_token: None,
            expires_in: Some(3600),
            obtained_at: 1_000,
        };
        assert_eq!(token.expires_at(), Some(4_600));

        let open_ended = IdentityToken {
            expires_in: None,
            ..token
        };
        assert_eq!(open_ended.expires_at(), None);
    }
}
