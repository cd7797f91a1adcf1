//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::{HeaderValue, header::InvalidHeaderValue};
use tokio::task::JoinHandle;

use crate::catalog::{Catalog, CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::content::{ContentError, ContentStore};
use crate::identity::{IdentityClient, IdentityError};
use crate::middleware::{SessionLocks, content_security_policy};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("content: {0}")]
    Content(#[from] ContentError),
    #[error("content security policy: {0}")]
    Csp(#[from] InvalidHeaderValue),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    catalog_client: CatalogClient,
    identity: IdentityClient,
    content: ContentStore,
    csp: HeaderValue,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state with the catalog still loading.
    ///
    /// # Errors
    ///
    /// Returns an error if a client URL cannot be built or an embedded page
    /// fails to parse.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog_client = CatalogClient::new(&config.catalog)?;
        let identity = IdentityClient::new(&config.identity)?;
        let content = ContentStore::embedded()?;
        let csp = HeaderValue::from_str(&content_security_policy(&identity.origin()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::new(),
                catalog_client,
                identity,
                content,
                csp,
                session_locks: SessionLocks::new(),
            }),
        })
    }

    /// Spawn the one-shot catalog fetch.
    ///
    /// Call once at startup. The returned handle completes when the catalog
    /// has settled.
    pub fn start_catalog_fetch(&self) -> JoinHandle<()> {
        let catalog = self.inner.catalog.clone();
        let client = self.inner.catalog_client.clone();
        tracing::info!(endpoint = %client.endpoint(), "Fetching catalog");
        tokio::spawn(async move { catalog.load(&client).await })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared catalog status.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get a reference to the content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Content Security Policy header value.
    #[must_use]
    pub fn csp(&self) -> &HeaderValue {
        &self.inner.csp
    }

    /// Per-session request locks.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }

    /// Callback URL registered with the identity provider.
    #[must_use]
    pub fn auth_callback_url(&self) -> String {
        format!("{}/auth/callback", self.inner.config.base_url)
    }
}
