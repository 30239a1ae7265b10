//! The catalog client seam.

use super::page::CatalogPage;
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a [`CatalogClient`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Transport failure or timeout; no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The catalog answered with a non-success status.
    #[error("Catalog server returned HTTP {status}")]
    Server { status: u16 },

    /// The payload could not be decoded into a page.
    #[error("Failed to decode catalog response: {0}")]
    Decoding(String),

    /// The request was rejected before being sent.
    #[error("Invalid catalog request: {0}")]
    InvalidRequest(String),
}

/// Source of paginated products.
///
/// Implementations must be safe to share across tasks; the query engine
/// holds one behind an `Arc`.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Browse the full catalog.
    async fn list_products(&self, skip: u64, limit: u64) -> Result<CatalogPage, CatalogError>;

    /// Free-text search. `query` is already trimmed and lower-cased.
    async fn search_products(
        &self,
        query: &str,
        skip: u64,
        limit: u64,
    ) -> Result<CatalogPage, CatalogError>;
}

pub(crate) fn check_limit(limit: u64) -> Result<(), CatalogError> {
    if limit == 0 {
        return Err(CatalogError::InvalidRequest(
            "limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
