//! Favorites: a deduplicated, most-recent-first list of products.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use storefront_cache::Cache;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Storage key for the persisted favorites.
pub const FAVORITES_STORAGE_KEY: &str = "favorite_products_v1";

/// Persistent favorites list.
///
/// Newly added products go to the front. Every effective mutation writes the
/// whole list under [`FAVORITES_STORAGE_KEY`] and publishes the new count.
pub struct FavoritesSet {
    products: Vec<Product>,
    cache: Cache,
    notifier: watch::Sender<usize>,
}

impl FavoritesSet {
    /// Restore favorites from `cache`. Missing or unreadable data yields an
    /// empty set.
    pub fn load(cache: Cache) -> Self {
        let products = match cache.get::<Vec<Product>>(FAVORITES_STORAGE_KEY) {
            Ok(Some(products)) => products,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, key = FAVORITES_STORAGE_KEY, "discarding unreadable favorites");
                Vec::new()
            }
        };
        let (notifier, _) = watch::channel(products.len());
        Self {
            products,
            cache,
            notifier,
        }
    }

    /// Receive the favorites count after every change.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.notifier.subscribe()
    }

    pub fn is_favorite(&self, id: ProductId) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    /// Favorites, most recently added first.
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Flip `product`'s membership, returning whether it is now a favorite.
    pub fn toggle(&mut self, product: &Product) -> Result<bool, CommerceError> {
        if self.is_favorite(product.id) {
            self.remove(product.id)?;
            Ok(false)
        } else {
            self.add(product)?;
            Ok(true)
        }
    }

    /// Insert at the front. Returns `false` if already present.
    pub fn add(&mut self, product: &Product) -> Result<bool, CommerceError> {
        if self.is_favorite(product.id) {
            return Ok(false);
        }
        let mut products = Vec::with_capacity(self.products.len() + 1);
        products.push(product.clone());
        products.extend(self.products.iter().cloned());
        self.commit(products)?;
        Ok(true)
    }

    pub fn remove(&mut self, id: ProductId) -> Result<bool, CommerceError> {
        if !self.is_favorite(id) {
            return Ok(false);
        }
        let products = self.products.iter().filter(|p| p.id != id).cloned().collect();
        self.commit(products)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.commit(Vec::new())
    }

    /// Persist `products`, then adopt them and publish the count.
    fn commit(&mut self, products: Vec<Product>) -> Result<(), CommerceError> {
        self.cache.set(FAVORITES_STORAGE_KEY, &products)?;
        self.products = products;
        debug!(count = self.products.len(), "favorites updated");
        self.notifier.send_replace(self.products.len());
        Ok(())
    }
}

impl std::fmt::Debug for FavoritesSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesSet")
            .field("count", &self.products.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::fixtures::switchable_cache;
    use crate::catalog::fixtures::product;

    fn ids(favorites: &FavoritesSet) -> Vec<u64> {
        favorites.all().iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let mut favorites = FavoritesSet::load(Cache::in_memory());
        favorites.add(&product(1, "x", 1.0)).unwrap();
        favorites.add(&product(2, "x", 1.0)).unwrap();
        favorites.add(&product(3, "x", 1.0)).unwrap();
        assert_eq!(ids(&favorites), vec![3, 2, 1]);
    }

    #[test]
    fn test_add_is_deduplicated() {
        let mut favorites = FavoritesSet::load(Cache::in_memory());
        let p = product(1, "x", 1.0);
        assert!(favorites.add(&p).unwrap());
        assert!(!favorites.add(&p).unwrap());
        assert_eq!(favorites.len(), 1);
    }

    #[test]
    fn test_toggle() {
        let mut favorites = FavoritesSet::load(Cache::in_memory());
        let rx = favorites.subscribe();
        let p = product(5, "x", 1.0);

        assert!(favorites.toggle(&p).unwrap());
        assert!(favorites.is_favorite(p.id));
        assert_eq!(*rx.borrow(), 1);

        assert!(!favorites.toggle(&p).unwrap());
        assert!(!favorites.is_favorite(p.id));
        assert_eq!(*rx.borrow(), 0);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut favorites = FavoritesSet::load(Cache::in_memory());
        let mut rx = favorites.subscribe();
        assert!(!favorites.remove(ProductId::new(9)).unwrap());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 0);
    }

    #[test]
    fn test_persists_order() {
        let cache = Cache::in_memory();
        let mut favorites = FavoritesSet::load(cache.clone());
        favorites.add(&product(1, "x", 1.0)).unwrap();
        favorites.add(&product(2, "x", 1.0)).unwrap();

        let reloaded = FavoritesSet::load(cache.clone());
        assert_eq!(ids(&reloaded), vec![2, 1]);

        favorites.clear().unwrap();
        assert!(FavoritesSet::load(cache).is_empty());
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        let cache = Cache::in_memory();
        cache.set(FAVORITES_STORAGE_KEY, &42).unwrap();
        assert!(FavoritesSet::load(cache).is_empty());
    }

    #[test]
    fn test_failed_save_keeps_previous_state() {
        let (cache, store) = switchable_cache();
        let mut favorites = FavoritesSet::load(cache.clone());
        favorites.add(&product(1, "x", 1.0)).unwrap();

        let rx = favorites.subscribe();
        store.set_read_only(true);

        assert!(favorites.add(&product(2, "x", 1.0)).is_err());
        assert!(favorites.toggle(&product(1, "x", 1.0)).is_err());
        assert!(favorites.clear().is_err());

        assert_eq!(ids(&favorites), vec![1]);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(ids(&FavoritesSet::load(cache)), vec![1]);
    }
}
