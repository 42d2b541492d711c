//! Product data source client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP: `GET /products` and `GET /products/{id}`
//! - One request per call: no caching, no retry, no partial results
//! - The source is the only owner of product data; every view transition
//!   that needs a product re-fetches it
//!
//! # Example
//!
//! ```rust,ignore
//! use product_app::catalog::ProductCatalogClient;
//!
//! let client = ProductCatalogClient::new(config.product_api_url.clone());
//!
//! let products = client.fetch_catalog().await.unwrap_or_default();
//! let product = client.fetch_product(ProductId::new(7)).await?;
//! ```

use std::sync::Arc;

use product_app_core::{Product, ProductId};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors that can occur when talking to the product data source.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be loaded at all.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// No usable record exists for the requested product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the product data source.
#[derive(Clone)]
pub struct ProductCatalogClient {
    inner: Arc<ProductCatalogClientInner>,
}

struct ProductCatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ProductCatalogClient {
    /// Create a client for the data source at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client sharing an existing connection pool.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            inner: Arc::new(ProductCatalogClientInner { client, base_url }),
        }
    }

    /// Fetch the whole product collection.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Unavailable` on any transport, status, or decode
    /// failure. Callers show an empty catalog in that case.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products"]);

        let body = self
            .get_text(url)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let products: Vec<Product> = parse_json(&body)
            .map_err(|e| CatalogError::Unavailable(format!("undecodable catalog: {e}")))?;

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ProductNotFound` if the source answers with an
    /// empty body, `null`, a 404, or a record that does not decode. Transport
    /// failures surface as `CatalogError::Http`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()]);

        let response = self.inner.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::ProductNotFound(id));
        }
        let body = response.error_for_status()?.text().await?;

        // The source answers unknown IDs with 200 and an empty body
        if body.trim().is_empty() {
            return Err(CatalogError::ProductNotFound(id));
        }

        let product: Option<Product> = parse_json(&body).map_err(|e| {
            tracing::warn!(error = %e, "Undecodable product record");
            CatalogError::ProductNotFound(id)
        })?;

        match product {
            Some(product) if product.id == id => Ok(product),
            Some(product) => {
                tracing::warn!(returned_id = %product.id, "Product source returned a different record");
                Err(CatalogError::ProductNotFound(id))
            }
            None => Err(CatalogError::ProductNotFound(id)),
        }
    }

    async fn get_text(&self, url: Url) -> Result<String, CatalogError> {
        let response = self.inner.client.get(url).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(
            error = %e,
            body = %body.chars().take(200).collect::<String>(),
            "Failed to parse product source response"
        );
        CatalogError::Parse(e)
    })
}
