//! Cart module.
//!
//! Contains the persistent cart ledger and checkout pricing.

mod ledger;
mod pricing;

pub use ledger::{CartEntry, CartLedger, CartSummary, CART_STORAGE_KEY, MAX_QUANTITY};
pub use pricing::CartPricing;

#[cfg(test)]
pub(crate) use ledger::fixtures;
