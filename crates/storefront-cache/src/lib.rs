//! Typed key-value persistence for storefront state.
//!
//! Stores are opaque blob maps; [`Cache`] adds JSON serialization on top so
//! callers read and write their own types.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_cache::Cache;
//!
//! let cache = Cache::open_dir(".storefront")?;
//!
//! // Store a value
//! cache.set("cart_items_v1", &entries)?;
//!
//! // Retrieve a value
//! let entries: Option<Vec<CartEntry>> = cache.get("cart_items_v1")?;
//!
//! // Delete a value
//! cache.delete("cart_items_v1")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KeyValueStore};
}
