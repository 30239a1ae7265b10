//! Composition root.
//!
//! Owns the long-lived storefront services and hands out per-screen ones.

use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_cache::Cache;
use storefront_observability::LoggingError;
use tracing::info;

use crate::cart::CartLedger;
use crate::catalog::{CatalogClient, HttpCatalogClient};
use crate::checkout::{Checkout, CheckoutError, OrderConfirmation, PaymentForm, PaymentGateway, SimulatedGateway};
use crate::config::{StorageBackend, StorefrontConfig};
use crate::favorites::FavoritesSet;
use crate::search::CatalogQueryEngine;

/// Application services shared by every screen.
pub struct AppContainer {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogClient>,
    cache: Cache,
    cart: CartLedger,
    favorites: FavoritesSet,
    gateway: Arc<dyn PaymentGateway>,
}

impl AppContainer {
    /// Build the HTTP catalog client, storage and simulated gateway from
    /// `config`.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        config.validate().context("Invalid storefront config")?;

        let catalog = HttpCatalogClient::new(&config.catalog.base_url, config.catalog.timeout())
            .context("Failed to build catalog client")?;
        let cache = match config.storage.backend {
            StorageBackend::Memory => Cache::in_memory(),
            StorageBackend::File => Cache::open_dir(&config.storage.path).with_context(|| {
                format!(
                    "Failed to open storage directory: {}",
                    config.storage.path.display()
                )
            })?,
        };
        let gateway =
            SimulatedGateway::new(config.checkout.success_rate, config.checkout.latency());

        info!(
            base_url = %config.catalog.base_url,
            storage = ?config.storage.backend,
            "storefront initialised"
        );
        Ok(Self::from_parts(
            config,
            Arc::new(catalog),
            cache,
            Arc::new(gateway),
        ))
    }

    /// Assemble from explicit services. Cart and favorites are loaded from
    /// `cache`.
    pub fn from_parts(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogClient>,
        cache: Cache,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let cart = CartLedger::load(cache.clone());
        let favorites = FavoritesSet::load(cache.clone());
        Self {
            config,
            catalog,
            cache,
            cart,
            favorites,
            gateway,
        }
    }

    /// Install the global `tracing` subscriber from the `[logging]` section.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        storefront_observability::init(&self.config.logging)
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn catalog(&self) -> Arc<dyn CatalogClient> {
        Arc::clone(&self.catalog)
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartLedger {
        &mut self.cart
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesSet {
        &mut self.favorites
    }

    /// A fresh engine for one browsing session.
    pub fn new_query_engine(&self) -> CatalogQueryEngine {
        CatalogQueryEngine::new(self.catalog(), self.config.catalog.engine_settings())
    }

    /// A fresh checkout session.
    pub fn new_checkout(&self) -> Checkout {
        Checkout::new()
    }

    /// Pay for the cart with the configured gateway.
    pub async fn pay(
        &mut self,
        checkout: &mut Checkout,
        form: &PaymentForm,
    ) -> Result<OrderConfirmation, CheckoutError> {
        checkout
            .pay(&mut self.cart, form, self.gateway.as_ref())
            .await
    }
}

impl std::fmt::Debug for AppContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContainer")
            .field("config", &self.config)
            .field("cart", &self.cart)
            .field("favorites", &self.favorites)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;
    use crate::catalog::{CatalogError, CatalogPage};
    use crate::config::StorageConfig;
    use async_trait::async_trait;

    struct OnePage;

    #[async_trait]
    impl CatalogClient for OnePage {
        async fn list_products(&self, skip: u64, limit: u64) -> Result<CatalogPage, CatalogError> {
            Ok(CatalogPage::new(vec![product(1, "x", 5.0)], 1, skip, limit))
        }

        async fn search_products(
            &self,
            _query: &str,
            skip: u64,
            limit: u64,
        ) -> Result<CatalogPage, CatalogError> {
            Ok(CatalogPage::new(Vec::new(), 0, skip, limit))
        }
    }

    fn container(config: StorefrontConfig, cache: Cache) -> AppContainer {
        AppContainer::from_parts(
            config,
            Arc::new(OnePage),
            cache,
            Arc::new(SimulatedGateway::always_approve()),
        )
    }

    #[test]
    fn test_from_default_config() {
        let app = AppContainer::from_config(StorefrontConfig::default()).unwrap();
        assert!(app.cart().is_empty());
        assert!(app.favorites().is_empty());
        assert_eq!(app.new_query_engine().settings().page_size, 20);
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = StorefrontConfig::default();
        config.catalog.page_size = 0;
        assert!(AppContainer::from_config(config).is_err());
    }

    #[test]
    fn test_file_storage_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            storage: StorageConfig {
                backend: StorageBackend::File,
                path: dir.path().to_path_buf(),
            },
            ..StorefrontConfig::default()
        };

        let mut app = AppContainer::from_config(config.clone()).unwrap();
        app.cart_mut().add(&product(1, "x", 5.0)).unwrap();
        app.favorites_mut().add(&product(2, "y", 1.0)).unwrap();
        drop(app);

        let app = AppContainer::from_config(config).unwrap();
        assert_eq!(app.cart().total_quantity(), 1);
        assert!(app.favorites().is_favorite(product(2, "y", 1.0).id));
    }

    #[tokio::test]
    async fn test_engine_uses_configured_page_size() {
        let mut config = StorefrontConfig::default();
        config.catalog.page_size = 7;
        let app = container(config, Cache::in_memory());

        let mut engine = app.new_query_engine();
        let request = engine.begin_fetch(true).unwrap();
        assert_eq!(request.limit(), 7);
        let page = request.execute(app.catalog().as_ref()).await.unwrap();
        engine.complete_fetch(request, Ok(page)).unwrap();
        assert_eq!(engine.visible().len(), 1);
    }

    #[tokio::test]
    async fn test_pay_through_container() {
        let mut app = container(StorefrontConfig::default(), Cache::in_memory());
        app.cart_mut().add(&product(1, "x", 5.0)).unwrap();

        let mut checkout = app.new_checkout();
        let form = PaymentForm {
            full_name: "Alan Turing".to_string(),
            card_number: "4000 0000 0000 0002".to_string(),
            expiry: "06/28".to_string(),
            cvv: "999".to_string(),
            address: "Bletchley Park".to_string(),
        };
        let confirmation = app.pay(&mut checkout, &form).await.unwrap();
        assert_eq!(confirmation.amount.amount_cents, 500);
        assert!(app.cart().is_empty());
    }
}
