//! Query mode and sort options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort options for the visible product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Fetch order, no reordering.
    #[default]
    Relevance,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by highest rated.
    RatingDesc,
    /// Sort by biggest discount; no discount counts as 0.
    DiscountDesc,
}

impl SortOption {
    /// All options in menu order.
    pub const ALL: [SortOption; 5] = [
        SortOption::Relevance,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::RatingDesc,
        SortOption::DiscountDesc,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::RatingDesc => "Highest Rated",
            SortOption::DiscountDesc => "Biggest Discount",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which endpoint the engine paginates against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QueryMode {
    /// Full catalog listing.
    #[default]
    Browse,
    /// Server-side search for a normalized, non-empty query.
    Search { query: String },
}

impl QueryMode {
    /// Search mode for `text`, or browse mode if it normalizes to empty.
    pub fn search(text: &str) -> Self {
        let query = normalize_query(text);
        if query.is_empty() {
            QueryMode::Browse
        } else {
            QueryMode::Search { query }
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, QueryMode::Search { .. })
    }

    /// Active search text, `None` in browse mode.
    pub fn query(&self) -> Option<&str> {
        match self {
            QueryMode::Browse => None,
            QueryMode::Search { query } => Some(query),
        }
    }
}

/// Trim and case-fold user input.
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  iPhone 15 "), "iphone 15");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_search_mode_constructor() {
        assert_eq!(QueryMode::search("  "), QueryMode::Browse);
        assert_eq!(
            QueryMode::search(" Laptop"),
            QueryMode::Search {
                query: "laptop".to_string()
            }
        );
        assert_eq!(QueryMode::search("Laptop").query(), Some("laptop"));
        assert!(QueryMode::search("x").is_search());
        assert!(!QueryMode::Browse.is_search());
    }

    #[test]
    fn test_sort_display_names() {
        assert_eq!(SortOption::default(), SortOption::Relevance);
        assert_eq!(SortOption::PriceAsc.to_string(), "Price: Low to High");
        assert_eq!(SortOption::ALL.len(), 5);
    }
}
