//! Storefront domain: catalog browsing, cart, favorites and checkout.
//!
//! - **Catalog**: products, pages and the [`CatalogClient`](catalog::CatalogClient) seam
//! - **Search**: the catalog query engine with paging, category filter and sort
//! - **Cart**: persistent ledger with derived totals
//! - **Favorites**: persistent most-recent-first set
//! - **Checkout**: delivery options, payment validation, simulated gateway
//! - **App**: configuration and the composition root
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//!
//! let app = AppContainer::from_config(StorefrontConfig::load("storefront.toml")?)?;
//! app.init_logging()?;
//!
//! let mut engine = app.new_query_engine();
//! engine.reset(QueryMode::Browse).await?;
//! engine.set_sort_option(SortOption::PriceAsc);
//!
//! for (index, product) in engine.visible().iter().enumerate() {
//!     println!("{} {}", product.title, product.discounted_price());
//!     if engine.should_prefetch(index) {
//!         // schedule engine.fetch_next_page_if_needed(false)
//!     }
//! }
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod app;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod favorites;
pub mod search;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::app::AppContainer;
    pub use crate::config::{StorageBackend, StorefrontConfig};

    // Catalog
    pub use crate::catalog::{CatalogClient, CatalogError, CatalogPage, HttpCatalogClient, Product};

    // Search
    pub use crate::search::{
        CatalogQueryEngine, EngineSettings, FetchOutcome, PageRequest, QueryMode, QuerySnapshot,
        SortOption,
    };

    // Cart
    pub use crate::cart::{CartEntry, CartLedger, CartPricing, CartSummary};
    pub use crate::favorites::FavoritesSet;

    // Checkout
    pub use crate::checkout::{
        Checkout, CheckoutError, CheckoutState, DeliveryOption, OrderConfirmation, PaymentForm,
        PaymentGateway, SimulatedGateway,
    };
}
