//! [`CatalogClient`] over the dummyjson-style `/products` endpoints.

use super::client::{check_limit, CatalogClient, CatalogError};
use super::page::CatalogPage;
use async_trait::async_trait;
use std::time::Duration;
use storefront_data::{ClientRequestBuilder, FetchClient, FetchError};
use tracing::debug;

/// Catalog client backed by HTTP.
///
/// `GET {base}/products?limit=L&skip=S` for browsing and
/// `GET {base}/products/search?q=Q&limit=L&skip=S` for search.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    fetch: FetchClient,
}

impl HttpCatalogClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let fetch = FetchClient::new()
            .map_err(map_fetch_error)?
            .with_base_url(base_url)
            .with_default_header("accept", "application/json")
            .with_timeout(timeout);
        Ok(Self { fetch })
    }

    /// Wrap an already configured fetch client.
    pub fn from_fetch_client(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.fetch.base_url()
    }

    async fn fetch_page(&self, request: ClientRequestBuilder) -> Result<CatalogPage, CatalogError> {
        let response = request
            .send()
            .await
            .map_err(map_fetch_error)?
            .error_for_status()
            .map_err(map_fetch_error)?;
        let page: CatalogPage = response.json().map_err(map_fetch_error)?;
        debug!(
            items = page.items.len(),
            total = page.total,
            skip = page.skip,
            "catalog page received"
        );
        Ok(page)
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_products(&self, skip: u64, limit: u64) -> Result<CatalogPage, CatalogError> {
        check_limit(limit)?;
        let request = self
            .fetch
            .get("/products")
            .query("limit", limit)
            .query("skip", skip);
        self.fetch_page(request).await
    }

    async fn search_products(
        &self,
        query: &str,
        skip: u64,
        limit: u64,
    ) -> Result<CatalogPage, CatalogError> {
        check_limit(limit)?;
        let request = self
            .fetch
            .get("/products/search")
            .query("q", query)
            .query("limit", limit)
            .query("skip", skip);
        self.fetch_page(request).await
    }
}

fn map_fetch_error(err: FetchError) -> CatalogError {
    match err {
        FetchError::HttpError { status, .. } => CatalogError::Server { status },
        FetchError::InvalidUrl(msg) => CatalogError::InvalidRequest(msg),
        FetchError::JsonError(msg) | FetchError::ParseError(msg) => CatalogError::Decoding(msg),
        FetchError::Timeout => CatalogError::Network("request timed out".to_string()),
        FetchError::RequestError(msg) => CatalogError::Network(msg),
    }
}
