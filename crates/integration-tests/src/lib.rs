//! End-to-end test harness for the Shopfront storefront.
//!
//! Each [`TestContext`] starts a real storefront on an ephemeral port,
//! backed by mock catalog and identity provider servers. Requests go over
//! HTTP through a `reqwest` client that keeps cookies and does not follow
//! redirects, so tests can assert on each hop.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::start(CatalogResponse::products(json!([]))).await;
//! let resp = ctx.get("/").await;
//! assert_eq!(resp.status(), 200);
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use httpmock::{Mock, MockServer};
use reqwest::{Client, Response, redirect};
use secrecy::SecretString;
use shopfront_storefront::{
    app,
    config::{CatalogConfig, IdentityConfig, StorefrontConfig},
    state::AppState,
};
use tokio::task::JoinHandle;
use url::Url;

/// Client id the mock identity provider expects.
pub const CLIENT_ID: &str = "integration-client";

/// How the mock catalog answers `GET /api/data`.
#[derive(Debug, Clone)]
pub struct CatalogResponse {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl CatalogResponse {
    /// A successful response carrying `products`.
    #[must_use]
    pub fn products(products: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: products.to_string(),
            delay: None,
        }
    }

    /// An error response with the given status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: None,
        }
    }

    /// Hold the response back; the storefront stays in its loading state
    /// for at least `delay`.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A running storefront with its mock collaborators.
pub struct TestContext {
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
    /// Public URL of the storefront, without trailing slash.
    pub base_url: String,
    /// Mock product service.
    pub catalog: MockServer,
    /// Mock identity provider.
    pub identity: MockServer,
    /// Shared state of the running storefront.
    pub state: AppState,
    catalog_mock_id: usize,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start the storefront and run its catalog fetch.
    ///
    /// Returns once the catalog has settled, unless the response is delayed.
    pub async fn start(catalog_response: CatalogResponse) -> Self {
        let catalog = MockServer::start_async().await;
        let identity = MockServer::start_async().await;

        let catalog_mock_id = catalog
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/api/data");
                let then = then
                    .status(catalog_response.status)
                    .header("content-type", "application/json")
                    .body(&catalog_response.body);
                if let Some(delay) = catalog_response.delay {
                    then.delay(delay);
                }
            })
            .await
            .id;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: base_url.clone(),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static")),
            catalog: CatalogConfig {
                base_url: Url::parse(&format!("{}/", catalog.base_url())).unwrap(),
            },
            identity: IdentityConfig {
                issuer_url: Url::parse(&format!("{}/", identity.base_url())).unwrap(),
                client_id: CLIENT_ID.to_string(),
                client_secret: SecretString::from("Zq8#mV2!rT6pLw9$"),
                audience: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config).unwrap();
        let fetch = state.start_catalog_fetch();
        if catalog_response.delay.is_none() {
            fetch.await.unwrap();
        }

        let router = app(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            client,
            base_url,
            catalog,
            identity,
            state,
            catalog_mock_id,
            server,
        }
    }

    /// Number of requests the mock catalog has received.
    pub async fn catalog_hits(&self) -> usize {
        Mock::new(self.catalog_mock_id, &self.catalog)
            .hits_async()
            .await
    }

    /// `GET` a storefront path.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// `POST` a form to a storefront path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// `GET` a storefront path and return the body.
    pub async fn page(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// Log in as `name` through the mock identity provider.
    ///
    /// Walks the real flow: `/auth/login`, the provider redirect, then
    /// `/auth/callback` with the state the storefront issued.
    pub async fn login(&self, subject: &str, name: &str) {
        self.identity
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/oauth/token")
                    .body_contains("code=integration-code");
                then.status(200).json_body(serde_json::json!({
                    "access_token": "integration-access",
                    "id_token": "integration-id",
                    "expires_in": 3600,
                    "token_type": "Bearer"
                }));
            })
            .await;
        self.identity
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/userinfo")
                    .header("authorization", "Bearer integration-access");
                then.status(200).json_body(serde_json::json!({
                    "sub": subject,
                    "name": name,
                    "email": "shopper@example.com"
                }));
            })
            .await;

        let login = self.get("/auth/login").await;
        assert!(login.status().is_redirection());
        let authorize = Url::parse(location(&login)).unwrap();
        let state = authorize
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .unwrap();

        let callback = self
            .get(&format!("/auth/callback?code=integration-code&state={state}"))
            .await;
        assert_eq!(location(&callback), "/");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
