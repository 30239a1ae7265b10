//! The local filter and sort pass that derives the visible list.
//!
//! Text search is delegated to the catalog server, so the only local filter
//! is the category. Every sort is stable: ties keep fetch order.

use super::query::SortOption;
use crate::catalog::Product;
use std::collections::BTreeSet;

/// Project `accumulated` through the category filter and sort option.
pub fn apply(accumulated: &[Product], category: Option<&str>, sort: SortOption) -> Vec<Product> {
    let mut visible: Vec<Product> = accumulated
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .cloned()
        .collect();

    match sort {
        SortOption::Relevance => {}
        SortOption::PriceAsc => visible.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::PriceDesc => visible.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::RatingDesc => visible.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortOption::DiscountDesc => visible
            .sort_by(|a, b| b.effective_discount().total_cmp(&a.effective_discount())),
    }
    visible
}

/// Distinct categories seen in `products`, alphabetically.
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
