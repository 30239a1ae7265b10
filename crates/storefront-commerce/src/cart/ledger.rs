//! The cart ledger: product quantities keyed by product id.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use storefront_cache::Cache;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Storage key for the persisted ledger.
pub const CART_STORAGE_KEY: &str = "cart_items_v1";

/// Maximum quantity allowed per entry.
pub const MAX_QUANTITY: u32 = 9999;

/// One product in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Discounted unit price.
    pub fn unit_price(&self) -> Money {
        self.product.discounted_price()
    }

    /// Unit price times quantity, `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_mul(i64::from(self.quantity))
    }
}

/// Totals published after every cart change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub total_quantity: u32,
    pub unique_count: usize,
    pub subtotal: Money,
}

/// Persistent shopping cart.
///
/// Every effective mutation writes the whole ledger under
/// [`CART_STORAGE_KEY`] and publishes a [`CartSummary`]. Mutations that name
/// a product not in the cart do nothing.
pub struct CartLedger {
    entries: Vec<CartEntry>,
    cache: Cache,
    notifier: watch::Sender<CartSummary>,
}

impl CartLedger {
    /// Restore the ledger from `cache`. Missing or unreadable data yields an
    /// empty cart.
    pub fn load(cache: Cache) -> Self {
        let entries = match cache.get::<Vec<CartEntry>>(CART_STORAGE_KEY) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, key = CART_STORAGE_KEY, "discarding unreadable cart");
                Vec::new()
            }
        };
        debug!(entries = entries.len(), "cart loaded");

        let summary = summarize(&entries).unwrap_or_default();
        let (notifier, _) = watch::channel(summary);
        Self {
            entries,
            cache,
            notifier,
        }
    }

    /// Receive the cart summary after every change.
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.notifier.subscribe()
    }

    // ---- queries ----

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Number of distinct products.
    pub fn unique_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of discounted unit price times quantity.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        subtotal(&self.entries)
    }

    pub fn summary(&self) -> Result<CartSummary, CommerceError> {
        summarize(&self.entries)
    }

    /// Whether decreasing `id` would remove it, so the caller should confirm.
    pub fn should_confirm_remove(&self, id: ProductId) -> bool {
        self.get(id).is_some_and(|e| e.quantity <= 1)
    }

    // ---- mutations ----

    /// Add one unit of `product`, returning the new quantity.
    pub fn add(&mut self, product: &Product) -> Result<u32, CommerceError> {
        let mut entries = self.entries.clone();
        let quantity = match entries.iter_mut().find(|e| e.product.id == product.id) {
            Some(entry) => {
                entry.quantity = bump(entry.quantity)?;
                entry.quantity
            }
            None => {
                entries.push(CartEntry {
                    product: product.clone(),
                    quantity: 1,
                });
                1
            }
        };
        self.commit(entries)?;
        Ok(quantity)
    }

    /// Add one unit of a product already in the cart.
    pub fn increase(&mut self, id: ProductId) -> Result<bool, CommerceError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut entries = self.entries.clone();
        entries[index].quantity = bump(entries[index].quantity)?;
        self.commit(entries)?;
        Ok(true)
    }

    /// Remove one unit; the entry is dropped when it reaches zero.
    pub fn decrease(&mut self, id: ProductId) -> Result<bool, CommerceError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut entries = self.entries.clone();
        if entries[index].quantity <= 1 {
            entries.remove(index);
        } else {
            entries[index].quantity -= 1;
        }
        self.commit(entries)?;
        Ok(true)
    }

    /// Set an entry's quantity. Values below one are raised to one.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) -> Result<bool, CommerceError> {
        if quantity > MAX_QUANTITY {
            return Err(CommerceError::QuantityExceedsLimit(quantity, MAX_QUANTITY));
        }
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut entries = self.entries.clone();
        entries[index].quantity = quantity.max(1);
        self.commit(entries)?;
        Ok(true)
    }

    pub fn remove(&mut self, id: ProductId) -> Result<bool, CommerceError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut entries = self.entries.clone();
        entries.remove(index);
        self.commit(entries)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.commit(Vec::new())
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.entries.iter().position(|e| e.product.id == id)
    }

    /// Persist `entries`, then adopt them and publish. On error the ledger
    /// and its subscribers keep the previous state.
    fn commit(&mut self, entries: Vec<CartEntry>) -> Result<(), CommerceError> {
        let summary = summarize(&entries)?;
        self.cache.set(CART_STORAGE_KEY, &entries)?;
        self.entries = entries;
        debug!(
            quantity = summary.total_quantity,
            subtotal = %summary.subtotal,
            "cart updated"
        );
        self.notifier.send_replace(summary);
        Ok(())
    }
}

impl std::fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartLedger")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn bump(quantity: u32) -> Result<u32, CommerceError> {
    let next = quantity.checked_add(1).ok_or(CommerceError::Overflow)?;
    if next > MAX_QUANTITY {
        return Err(CommerceError::QuantityExceedsLimit(next, MAX_QUANTITY));
    }
    Ok(next)
}

fn subtotal(entries: &[CartEntry]) -> Result<Money, CommerceError> {
    entries
        .iter()
        .try_fold(Money::zero(Currency::USD), |acc, entry| {
            entry.line_total().and_then(|line| acc.checked_add(&line))
        })
        .ok_or(CommerceError::Overflow)
}

fn summarize(entries: &[CartEntry]) -> Result<CartSummary, CommerceError> {
    Ok(CartSummary {
        total_quantity: entries.iter().map(|e| e.quantity).sum(),
        unique_count: entries.len(),
        subtotal: subtotal(entries)?,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::switchable_cache;
    use crate::catalog::fixtures::product;

    fn ledger() -> CartLedger {
        CartLedger::load(Cache::in_memory())
    }

    #[test]
    fn test_add_new_and_existing() {
        let mut cart = ledger();
        let phone = product(1, "phones", 100.0);

        assert_eq!(cart.add(&phone).unwrap(), 1);
        assert_eq!(cart.add(&phone).unwrap(), 2);
        assert_eq!(cart.unique_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_subtotal_uses_discounted_price() {
        let mut cart = ledger();
        let mut shoe = product(1, "shoes", 50.0);
        shoe.discount_percentage = Some(10.0);
        let sock = product(2, "socks", 2.5);

        cart.add(&shoe).unwrap();
        cart.add(&shoe).unwrap();
        cart.add(&sock).unwrap();

        // 2 * 45.00 + 2.50
        assert_eq!(cart.subtotal().unwrap(), Money::usd(9250));
    }

    #[test]
    fn test_decrease_to_zero_removes() {
        let mut cart = ledger();
        let p = product(7, "x", 1.0);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        assert!(!cart.should_confirm_remove(p.id));
        assert!(cart.decrease(p.id).unwrap());
        assert_eq!(cart.get(p.id).unwrap().quantity, 1);
        assert!(cart.should_confirm_remove(p.id));

        assert!(cart.decrease(p.id).unwrap());
        assert!(!cart.contains(p.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_and_limits() {
        let mut cart = ledger();
        let p = product(3, "x", 1.0);
        cart.add(&p).unwrap();

        assert!(cart.set_quantity(p.id, 0).unwrap());
        assert_eq!(cart.get(p.id).unwrap().quantity, 1);

        assert!(cart.set_quantity(p.id, 42).unwrap());
        assert_eq!(cart.total_quantity(), 42);

        let err = cart.set_quantity(p.id, MAX_QUANTITY + 1).unwrap_err();
        assert!(matches!(err, CommerceError::QuantityExceedsLimit(10000, 9999)));
        assert_eq!(cart.total_quantity(), 42);
    }

    #[test]
    fn test_add_beyond_limit_fails() {
        let mut cart = ledger();
        let p = product(3, "x", 1.0);
        cart.add(&p).unwrap();
        cart.set_quantity(p.id, MAX_QUANTITY).unwrap();

        assert!(matches!(
            cart.add(&p),
            Err(CommerceError::QuantityExceedsLimit(_, _))
        ));
        assert_eq!(cart.get(p.id).unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut cart = ledger();
        let mut rx = cart.subscribe();
        let missing = ProductId::new(99);

        assert!(!cart.increase(missing).unwrap());
        assert!(!cart.decrease(missing).unwrap());
        assert!(!cart.set_quantity(missing, 3).unwrap());
        assert!(!cart.remove(missing).unwrap());
        assert!(!cart.should_confirm_remove(missing));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_quantity, 0);
    }

    #[test]
    fn test_persists_and_reloads() {
        let cache = Cache::in_memory();
        let mut cart = CartLedger::load(cache.clone());
        cart.add(&product(1, "x", 10.0)).unwrap();
        cart.add(&product(2, "y", 20.0)).unwrap();
        cart.increase(ProductId::new(2)).unwrap();

        let reloaded = CartLedger::load(cache.clone());
        assert_eq!(reloaded.entries(), cart.entries());
        assert_eq!(reloaded.subtotal().unwrap(), Money::usd(5000));

        cart.clear().unwrap();
        let stored: Vec<CartEntry> = cache.get(CART_STORAGE_KEY).unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_unreadable_storage_starts_empty() {
        let cache = Cache::in_memory();
        cache.set(CART_STORAGE_KEY, "not a cart").unwrap();
        let cart = CartLedger::load(cache);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_summary_published() {
        let mut cart = ledger();
        let rx = cart.subscribe();
        cart.add(&product(1, "x", 3.0)).unwrap();
        cart.add(&product(1, "x", 3.0)).unwrap();

        let summary = *rx.borrow();
        assert_eq!(summary.total_quantity, 2);
        assert_eq!(summary.unique_count, 1);
        assert_eq!(summary.subtotal, Money::usd(600));
    }

    #[test]
    fn test_failed_save_keeps_previous_state() {
        let (cache, store) = switchable_cache();
        let mut cart = CartLedger::load(cache.clone());
        let p = product(1, "x", 4.0);
        cart.add(&p).unwrap();

        let rx = cart.subscribe();
        store.set_read_only(true);

        assert!(matches!(cart.add(&p), Err(CommerceError::Cache(_))));
        assert!(cart.increase(p.id).is_err());
        assert!(cart.set_quantity(p.id, 5).is_err());
        assert!(cart.decrease(p.id).is_err());
        assert!(cart.remove(p.id).is_err());
        assert!(cart.add(&product(2, "y", 1.0)).is_err());
        assert!(cart.clear().is_err());

        assert_eq!(cart.get(p.id).unwrap().quantity, 1);
        assert_eq!(cart.unique_count(), 1);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow().total_quantity, 1);
        assert_eq!(CartLedger::load(cache).entries(), cart.entries());

        store.set_read_only(false);
        assert_eq!(cart.add(&p).unwrap(), 2);
        assert_eq!(rx.borrow().total_quantity, 2);
    }
}
