//! Identity provider client.
//!
//! Login is delegated to an external `OpenID` Connect provider using the
//! authorization-code flow. The storefront never sees passwords; it only
//! learns who the visitor is and what to call them.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the visitor to the provider's login page
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Fetch the profile with `user_info()`
//!
//! # Example
//!
//! ```rust,ignore
//! let client = IdentityClient::new(&config.identity)?;
//!
//! let auth_url = client.authorization_url("https://shop.test/auth/callback", &state);
//!
//! // After the callback
//! let token = client.exchange_code(&code, "https://shop.test/auth/callback").await?;
//! let profile = client.user_info(&token.access_token).await?;
//! ```

mod types;

pub use types::*;

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::IdentityConfig;

/// Scopes requested at login.
const LOGIN_SCOPE: &str = "openid profile email";

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the authorization code.
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The userinfo endpoint rejected the access token.
    #[error("User info request failed ({0})")]
    UserInfo(reqwest::StatusCode),

    /// An endpoint URL could not be built from the issuer URL.
    #[error("Invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    authorize_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
    logout_endpoint: Url,
    client_id: String,
    client_secret: String,
    audience: Option<String>,
}

impl IdentityClient {
    /// Create a new identity provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URLs cannot be derived from the issuer URL.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let issuer = &config.issuer_url;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                authorize_endpoint: issuer.join("authorize")?,
                token_endpoint: issuer.join("oauth/token")?,
                userinfo_endpoint: issuer.join("userinfo")?,
                logout_endpoint: issuer.join("v2/logout")?,
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                audience: config.audience.clone(),
            }),
        })
    }

    /// Origin of the identity provider (scheme, host and port).
    #[must_use]
    pub fn origin(&self) -> String {
        self.inner
            .authorize_endpoint
            .origin()
            .ascii_serialization()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Redirect URLs
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate the authorization URL for login.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    ///
    /// No `nonce` is sent: identity comes from the `userinfo` endpoint over
    /// TLS and the ID token is never read.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let mut url = self.inner.authorize_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.inner.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", LOGIN_SCOPE)
                .append_pair("state", state);
            if let Some(audience) = &self.inner.audience {
                query.append_pair("audience", audience);
            }
        }
        url.into()
    }

    /// Generate the provider logout URL.
    ///
    /// # Arguments
    ///
    /// * `return_to` - Where the provider should send the visitor afterwards
    #[must_use]
    pub fn logout_url(&self, return_to: &str) -> String {
        let mut url = self.inner.logout_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("returnTo", return_to);
        url.into()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token + Profile
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchange an authorization code for tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider rejects the code.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<IdentityToken, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(self.inner.token_endpoint.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::TokenExchange {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into())
    }

    /// Fetch the profile of the user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip_all)]
    pub async fn user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        let response = self
            .inner
            .client
            .get(self.inner.userinfo_endpoint.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::UserInfo(status));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;
    use crate::config::parse_base_url;

    fn client_for(issuer: &str, audience: Option<&str>) -> IdentityClient {
        IdentityClient::new(&IdentityConfig {
            issuer_url: parse_base_url(issuer).unwrap(),
            client_id: "client-abc".to_string(),
            client_secret: SecretString::from("s3cr3t-Value!"),
            audience: audience.map(String::from),
        })
        .unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let client = client_for("https://tenant.auth0.com", None);
        let url = Url::parse(&client.authorization_url(
            "http://localhost:3000/auth/callback",
            "state-1",
        ))
        .unwrap();

        assert_eq!(url.path(), "/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client-abc".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/auth/callback".into()
        )));
        assert!(pairs.contains(&("scope".into(), "openid profile email".into())));
        assert!(pairs.contains(&("state".into(), "state-1".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "nonce"));
        assert!(!pairs.iter().any(|(k, _)| k == "audience"));
    }

    #[test]
    fn test_authorization_url_with_audience() {
        let client = client_for("https://tenant.auth0.com", Some("https://api.shop"));
        let url = Url::parse(&client.authorization_url("cb", "s")).unwrap();
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "audience" && v == "https://api.shop")
        );
    }

    #[test]
    fn test_logout_url() {
        let client = client_for("https://tenant.auth0.com", None);
        assert_eq!(
            client.logout_url("http://localhost:3000/"),
            "https://tenant.auth0.com/v2/logout?client_id=client-abc&returnTo=http%3A%2F%2Flocalhost%3A3000%2F"
        );
    }

    #[test]
    fn test_origin() {
        let client = client_for("https://tenant.auth0.com/some/path", None);
        assert_eq!(client.origin(), "https://tenant.auth0.com");
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/oauth/token")
                    .body_contains("grant_type=authorization_code")
                    .body_contains("code=the-code");
                then.status(200).json_body(json!({
                    "access_token": "access-1",
                    "id_token": "id-1",
                    "expires_in": 86400,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let token = client_for(&server.base_url(), None)
            .exchange_code("the-code", "http://localhost:3000/auth/callback")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token.access_token, "access-1");
        assert_eq!(token.id_token.as_deref(), Some("id-1"));
        assert_eq!(token.expires_at(), Some(token.obtained_at + 86400));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(403).json_body(json!({"error": "invalid_grant"}));
            })
            .await;

        let err = client_for(&server.base_url(), None)
            .exchange_code("stale", "cb")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IdentityError::TokenExchange { status, .. } if status.as_u16() == 403
        ));
    }

    #[tokio::test]
    async fn test_user_info() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/userinfo")
                    .header("authorization", "Bearer access-1");
                then.status(200).json_body(json!({
                    "sub": "auth0|42",
                    "name": "Grace Hopper",
                    "email": "grace@example.com"
                }));
            })
            .await;

        let info = client_for(&server.base_url(), None)
            .user_info("access-1")
            .await
            .unwrap();

        assert_eq!(info.sub, "auth0|42");
        assert_eq!(info.display_name(), "Grace Hopper");
    }

    #[tokio::test]
    async fn test_user_info_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(401);
            })
            .await;

        let err = client_for(&server.base_url(), None)
            .user_info("expired")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::UserInfo(s) if s.as_u16() == 401));
    }
}
