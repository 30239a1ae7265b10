//! Catalog products, pages and the client that fetches them.

mod client;
mod http;
mod page;
mod product;

pub use client::{CatalogClient, CatalogError};
pub use http::HttpCatalogClient;
pub use page::CatalogPage;
pub use product::Product;

#[cfg(test)]
pub(crate) use product::fixtures;
