//! Product catalog: the one-shot fetch and its shared result.
//!
//! # Lifecycle
//!
//! The catalog starts out [`CatalogStatus::Loading`]. A background task
//! started at boot calls [`Catalog::load`], which performs exactly one
//! request and records either the products or the error message. There is
//! no retry; a failed catalog stays failed until the process restarts.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CatalogClient::new(&config.catalog)?;
//! let catalog = Catalog::new();
//!
//! tokio::spawn({
//!     let catalog = catalog.clone();
//!     async move { catalog.load(&client).await }
//! });
//!
//! match catalog.status() {
//!     CatalogStatus::Loading => { /* show spinner */ }
//!     CatalogStatus::Loaded(products) => { /* render */ }
//!     CatalogStatus::Failed(message) => { /* show message */ }
//! }
//! ```

mod client;

pub use client::{CATALOG_PATH, CatalogClient};

use std::sync::{Arc, RwLock};

use shopfront_core::{Product, ProductId};
use thiserror::Error;

/// Errors that can occur when fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The service answered with a non-success status.
    #[error("Failed to fetch products")]
    Status(reqwest::StatusCode),

    /// The request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not a list of products.
    #[error("Invalid catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog URL could not be built.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Outcome of the catalog fetch as seen by views.
#[derive(Debug, Clone)]
pub enum CatalogStatus {
    /// The fetch has not completed yet.
    Loading,
    /// The fetch succeeded.
    Loaded(Arc<Vec<Product>>),
    /// The fetch failed; holds the message shown to visitors.
    Failed(String),
}

/// Shared catalog state.
///
/// Cheaply cloneable; every clone observes the same status.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogStatus>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a catalog that is still loading.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogStatus::Loading)),
        }
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> CatalogStatus {
        self.inner
            .read()
            .map_or(CatalogStatus::Loading, |guard| guard.clone())
    }

    /// Whether the fetch has completed, successfully or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self.status(), CatalogStatus::Loading)
    }

    /// Look up a loaded product by id.
    ///
    /// Returns `None` while loading, after a failure, or for unknown ids.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        match self.status() {
            CatalogStatus::Loaded(products) => products.iter().find(|p| &p.id == id).cloned(),
            CatalogStatus::Loading | CatalogStatus::Failed(_) => None,
        }
    }

    /// Fetch the catalog once and record the outcome.
    pub async fn load(&self, client: &CatalogClient) {
        let result = client.fetch_products().await;
        self.settle(result);
    }

    /// Record the outcome of the fetch.
    ///
    /// Only the first outcome is kept; later calls are ignored.
    pub fn settle(&self, result: Result<Vec<Product>, CatalogError>) {
        let Ok(mut guard) = self.inner.write() else {
            tracing::error!("Catalog lock poisoned; dropping fetch result");
            return;
        };

        if !matches!(*guard, CatalogStatus::Loading) {
            tracing::warn!("Catalog already settled; ignoring second result");
            return;
        }

        *guard = match result {
            Ok(products) => {
                tracing::info!(count = products.len(), "Catalog loaded");
                CatalogStatus::Loaded(Arc::new(products))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed");
                CatalogStatus::Failed(e.to_string())
            }
        };
    }
}
