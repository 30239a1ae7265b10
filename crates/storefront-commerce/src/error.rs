//! Commerce error types.

use crate::money::Currency;
use thiserror::Error;

/// Errors that can occur in cart, favorites and configuration operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(u32, u32),

    /// Amounts in different currencies were combined.
    #[error("Currency mismatch: {0} vs {1}")]
    CurrencyMismatch(Currency, Currency),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Persistence error.
    #[error("Cache error: {0}")]
    Cache(#[from] storefront_cache::CacheError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
