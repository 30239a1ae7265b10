//! One page of catalog results.

use super::product::Product;
use serde::{Deserialize, Serialize};

/// A page of products plus the server's pagination counters.
///
/// `total` is authoritative for deciding whether more pages exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage {
    #[serde(rename = "products", default)]
    pub items: Vec<Product>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl CatalogPage {
    pub fn new(items: Vec<Product>, total: u64, skip: u64, limit: u64) -> Self {
        Self {
            items,
            total,
            skip,
            limit,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page() {
        let json = r#"{
            "products": [
                {"id": 1, "title": "A", "category": "beauty", "price": 9.99},
                {"id": 2, "title": "B", "category": "beauty", "price": 19.99}
            ],
            "total": 194,
            "skip": 0,
            "limit": 2
        }"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, 194);
        assert_eq!(page.limit, 2);
    }

    #[test]
    fn test_decode_empty_search_page() {
        let json = r#"{"products": [], "total": 0, "skip": 0, "limit": 0}"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
    }
}
