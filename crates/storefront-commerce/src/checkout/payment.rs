//! Payment form validation and the payment gateway seam.

use super::CheckoutError;
use crate::ids::PaymentReference;
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Fields of the payment form, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentField {
    FullName,
    CardNumber,
    Expiry,
    Cvv,
    Address,
}

impl PaymentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentField::FullName => "full_name",
            PaymentField::CardNumber => "card_number",
            PaymentField::Expiry => "expiry",
            PaymentField::Cvv => "cvv",
            PaymentField::Address => "address",
        }
    }
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payment form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub full_name: String,
    pub card_number: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
    pub address: String,
}

impl PaymentForm {
    /// Check every field in order and report the first problem.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.full_name.trim().chars().count() < 2 {
            return Err(invalid(PaymentField::FullName, "Please enter your full name."));
        }
        if digits_only(&self.card_number).len() != 16 {
            return Err(invalid(PaymentField::CardNumber, "Card number must be 16 digits."));
        }
        if !is_valid_expiry(self.expiry.trim()) {
            return Err(invalid(PaymentField::Expiry, "Expiry must be in MM/YY format."));
        }
        if digits_only(&self.cvv).len() != 3 {
            return Err(invalid(PaymentField::Cvv, "CVV must be 3 digits."));
        }
        if self.address.trim().chars().count() < 5 {
            return Err(invalid(PaymentField::Address, "Please enter your address."));
        }
        Ok(())
    }

    /// Last four card digits for receipts.
    pub fn card_last4(&self) -> Option<String> {
        let digits = digits_only(&self.card_number);
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].to_string())
    }
}

fn invalid(field: PaymentField, message: &'static str) -> CheckoutError {
    CheckoutError::InvalidField { field, message }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn is_valid_expiry(s: &str) -> bool {
    let Some((month, year)) = s.split_once('/') else {
        return false;
    };
    match (month.parse::<u8>(), year.parse::<u8>()) {
        (Ok(month), Ok(year)) => (1..=12).contains(&month) && year <= 99,
        _ => false,
    }
}

/// Result of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: PaymentReference,
    pub amount: Money,
}

/// Something that can take money.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount`. A refusal is [`CheckoutError::PaymentDeclined`].
    async fn charge(&self, amount: Money) -> Result<PaymentReceipt, CheckoutError>;
}

/// Default share of simulated charges that succeed.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Default simulated processing time.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(900);

/// Gateway that waits, then succeeds at random.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedGateway {
    success_rate: f64,
    latency: Duration,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE, DEFAULT_LATENCY)
    }
}

impl SimulatedGateway {
    /// `success_rate` is clamped to 0–1.
    pub fn new(success_rate: f64, latency: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency,
        }
    }

    /// Always approves, without delay.
    pub fn always_approve() -> Self {
        Self::new(1.0, Duration::ZERO)
    }

    /// Always declines, without delay.
    pub fn always_decline() -> Self {
        Self::new(0.0, Duration::ZERO)
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: Money) -> Result<PaymentReceipt, CheckoutError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let roll: f64 = rand::random();
        debug!(%amount, roll, success_rate = self.success_rate, "simulated charge");
        if roll < self.success_rate {
            Ok(PaymentReceipt {
                reference: PaymentReference::generate(),
                amount,
            })
        } else {
            Err(CheckoutError::PaymentDeclined)
        }
    }
}
