//! Product types as served by the catalog API.

use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A catalog product. Immutable once decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Category label, e.g. "smartphones".
    pub category: String,
    /// Brand name, absent for unbranded goods.
    #[serde(default)]
    pub brand: Option<String>,
    /// Unit price in dollars.
    pub price: f64,
    /// Discount percentage (0–100). Absent or non-positive means no discount.
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    /// Average rating, 0–5.
    #[serde(default)]
    pub rating: f64,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Thumbnail image URL.
    #[serde(default)]
    pub thumbnail: String,
    /// Gallery image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Whether a positive discount applies.
    pub fn has_discount(&self) -> bool {
        self.discount_percentage.is_some_and(|d| d > 0.0)
    }

    /// Discount percentage clamped to 0–100, with absent treated as 0.
    pub fn effective_discount(&self) -> f64 {
        self.discount_percentage.unwrap_or(0.0).clamp(0.0, 100.0)
    }

    /// List price.
    pub fn unit_price(&self) -> Money {
        Money::from_decimal(self.price, Currency::USD)
    }

    /// Price after discount; equals [`Product::unit_price`] when there is none.
    pub fn discounted_price(&self) -> Money {
        if self.has_discount() {
            self.unit_price().discounted_by(self.effective_discount())
        } else {
            self.unit_price()
        }
    }

    /// Badge text such as `"%15 OFF"`, `None` without a discount.
    pub fn discount_badge(&self) -> Option<String> {
        self.has_discount()
            .then(|| format!("%{} OFF", self.effective_discount().trunc() as u32))
    }

    /// Images for the detail gallery; falls back to the thumbnail.
    pub fn gallery_images(&self) -> Vec<&str> {
        if self.images.is_empty() {
            vec![self.thumbnail.as_str()]
        } else {
            self.images.iter().map(String::as_str).collect()
        }
    }

    /// Category label with each word capitalised ("home-decoration" stays hyphenated).
    pub fn category_tag(&self) -> String {
        self.category
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Brand name if present and non-blank.
    pub fn brand_tag(&self) -> Option<&str> {
        self.brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal product for tests.
    pub fn product(id: u64, category: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {}", id),
            description: String::new(),
            category: category.to_string(),
            brand: None,
            price,
            discount_percentage: None,
            rating: 4.0,
            stock: 10,
            thumbnail: format!("https://cdn.example.com/{}/thumb.png", id),
            images: Vec::new(),
        }
    }
}
