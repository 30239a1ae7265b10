//! Order totals for the checkout screen.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Subtotal, delivery fee and what the customer pays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartPricing {
    /// Sum of discounted line totals.
    pub subtotal: Money,
    /// Fee for the chosen delivery option.
    pub delivery_fee: Money,
    /// Subtotal plus delivery fee.
    pub total: Money,
}

impl CartPricing {
    pub fn new(subtotal: Money, delivery_fee: Money) -> Result<Self, CommerceError> {
        if subtotal.currency != delivery_fee.currency {
            return Err(CommerceError::CurrencyMismatch(
                subtotal.currency,
                delivery_fee.currency,
            ));
        }
        let total = subtotal
            .checked_add(&delivery_fee)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            subtotal,
            delivery_fee,
            total,
        })
    }

    /// Whether delivery costs nothing.
    pub fn has_free_delivery(&self) -> bool {
        self.delivery_fee.is_zero()
    }
}
