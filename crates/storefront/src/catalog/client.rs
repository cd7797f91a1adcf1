//! HTTP client for the product catalog service.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use shopfront_core::Product;
use tracing::{debug, instrument};
use url::Url;

use super::CatalogError;
use crate::config::CatalogConfig;

/// Path of the product listing, relative to the catalog base URL.
pub const CATALOG_PATH: &str = "api/data";

/// Client for the product catalog service.
///
/// Issues a single GET per call. No timeout or retry is applied; callers
/// decide what a failure means.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the product listing URL cannot be built from the
    /// configured base URL.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let endpoint = config.base_url.join(CATALOG_PATH)?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                endpoint,
            }),
        })
    }

    /// The full product listing URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Fetch every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Status`] for a non-2xx response,
    /// [`CatalogError::Http`] if the request could not be completed, and
    /// [`CatalogError::Parse`] if the body is not a JSON array of products.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Status(status));
        }

        let body = response.text().await?;
        let products: Vec<Product> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })?;

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::config::parse_base_url;

    fn client_for(base_url: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: parse_base_url(base_url).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_fixed_path() {
        let client = client_for("https://products.example.org/v1");
        assert_eq!(
            client.endpoint().as_str(),
            "https://products.example.org/v1/api/data"
        );
    }

    #[tokio::test]
    async fn test_fetch_products_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/data")
                    .header("accept", "application/json");
                then.status(200).json_body(json!([
                    {"_id": "a1", "name": "Mug", "price": 10.0, "image": "https://img/mug.png"},
                    {"_id": 2, "name": "Tea", "price": "5.50"}
                ]));
            })
            .await;

        let products = client_for(&server.base_url()).fetch_products().await.unwrap();

        mock.assert_async().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Mug");
        assert_eq!(products[1].id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_fetch_products_empty_array() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/data");
                then.status(200).json_body(json!([]));
            })
            .await;

        let products = client_for(&server.base_url()).fetch_products().await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_products_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/data");
                then.status(503).body("maintenance");
            })
            .await;

        let err = client_for(&server.base_url())
            .fetch_products()
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Status(s) if s.as_u16() == 503));
        assert_eq!(err.to_string(), "Failed to fetch products");
    }

    #[tokio::test]
    async fn test_fetch_products_invalid_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/data");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = client_for(&server.base_url())
            .fetch_products()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_products_rejects_oversized_price() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/data");
                then.status(200).json_body(json!([
                    {"_id": "big", "name": "Yacht", "price": "50000000000000000000000000000"}
                ]));
            })
            .await;

        let err = client_for(&server.base_url())
            .fetch_products()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert!(err.to_string().contains("price cannot exceed"));
    }

    #[tokio::test]
    async fn test_fetch_products_transport_failure() {
        let err = client_for("http://127.0.0.1:1")
            .fetch_products()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
