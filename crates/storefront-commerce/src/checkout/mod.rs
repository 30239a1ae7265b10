//! Checkout module.
//!
//! Delivery choice, payment form validation, the payment gateway seam and
//! the pay flow that empties the cart on success.

mod delivery;
mod flow;
mod payment;

pub use delivery::DeliveryOption;
pub use flow::{Checkout, CheckoutState, OrderConfirmation};
pub use payment::{
    PaymentField, PaymentForm, PaymentGateway, PaymentReceipt, SimulatedGateway,
    DEFAULT_LATENCY, DEFAULT_SUCCESS_RATE,
};

use crate::error::CommerceError;
use thiserror::Error;

/// Errors surfaced to the payment screen. Display text is user-facing.
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    CartEmpty,

    /// A form field failed validation.
    #[error("{message}")]
    InvalidField {
        field: PaymentField,
        message: &'static str,
    },

    #[error("Payment failed. Please try again.")]
    PaymentDeclined,

    /// Cart pricing or persistence failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CommerceError),
}
