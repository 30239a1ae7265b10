//! Delivery options offered at checkout.

use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// How the order is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    /// Free, 3–5 business days.
    #[default]
    Normal,
    /// Paid, next day.
    Express,
}

impl DeliveryOption {
    pub const ALL: [DeliveryOption; 2] = [DeliveryOption::Normal, DeliveryOption::Express];

    pub fn title(&self) -> &'static str {
        match self {
            DeliveryOption::Normal => "Normal",
            DeliveryOption::Express => "Express",
        }
    }

    pub fn fee(&self) -> Money {
        match self {
            DeliveryOption::Normal => Money::zero(Currency::USD),
            DeliveryOption::Express => Money::usd(499),
        }
    }

    /// Fee label, `"Free"` when nothing is charged.
    pub fn fee_text(&self) -> String {
        let fee = self.fee();
        if fee.is_zero() {
            "Free".to_string()
        } else {
            fee.display()
        }
    }

    pub fn eta_text(&self) -> &'static str {
        match self {
            DeliveryOption::Normal => "3–5 business days",
            DeliveryOption::Express => "Tomorrow",
        }
    }
}
