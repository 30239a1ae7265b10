//! The pay flow.

use super::delivery::DeliveryOption;
use super::payment::{PaymentForm, PaymentGateway};
use super::CheckoutError;
use crate::cart::{CartLedger, CartPricing};
use crate::ids::{OrderNumber, PaymentReference};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

/// Whether a payment is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Processing,
}

/// A paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub payment: PaymentReference,
    pub amount: Money,
    pub delivery: DeliveryOption,
}

/// Checkout session for one cart.
#[derive(Debug)]
pub struct Checkout {
    delivery: DeliveryOption,
    state: watch::Sender<CheckoutState>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    pub fn new() -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            delivery: DeliveryOption::Normal,
            state,
        }
    }

    pub fn delivery(&self) -> DeliveryOption {
        self.delivery
    }

    pub fn set_delivery(&mut self, option: DeliveryOption) {
        self.delivery = option;
    }

    pub fn state(&self) -> CheckoutState {
        *self.state.borrow()
    }

    /// Receive state changes (`Idle` → `Processing` → `Idle`).
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Totals for `cart` with the selected delivery option.
    pub fn pricing(&self, cart: &CartLedger) -> Result<CartPricing, CheckoutError> {
        let subtotal = cart.subtotal()?;
        Ok(CartPricing::new(subtotal, self.delivery.fee())?)
    }

    /// Validate `form`, charge the total and empty the cart on success.
    ///
    /// The state returns to `Idle` whatever the outcome. Once the charge is
    /// approved the confirmation is always returned; a cart that cannot be
    /// saved empty is logged and left as it was.
    pub async fn pay(
        &mut self,
        cart: &mut CartLedger,
        form: &PaymentForm,
        gateway: &dyn PaymentGateway,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }
        form.validate()?;
        let pricing = self.pricing(cart)?;

        self.state.send_replace(CheckoutState::Processing);
        let charged = gateway.charge(pricing.total).await;
        self.state.send_replace(CheckoutState::Idle);

        let receipt = match charged {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(amount = %pricing.total, error = %err, "payment failed");
                return Err(err);
            }
        };

        let confirmation = OrderConfirmation {
            order_number: OrderNumber::generate(),
            payment: receipt.reference,
            amount: receipt.amount,
            delivery: self.delivery,
        };
        if let Err(err) = cart.clear() {
            warn!(
                order = %confirmation.order_number,
                error = %err,
                "paid order but failed to clear cart"
            );
        }
        info!(
            order = %confirmation.order_number,
            amount = %confirmation.amount,
            delivery = self.delivery.title(),
            "order placed"
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::fixtures::switchable_cache;
    use crate::catalog::fixtures::product;
    use crate::checkout::SimulatedGateway;
    use storefront_cache::Cache;

    fn form() -> PaymentForm {
        PaymentForm {
            full_name: "Grace Hopper".to_string(),
            card_number: "5555555555554444".to_string(),
            expiry: "12/30".to_string(),
            cvv: "321".to_string(),
            address: "1 Navy Yard".to_string(),
        }
    }

    fn cart_with_items() -> CartLedger {
        let mut cart = CartLedger::load(Cache::in_memory());
        let mut p = product(1, "x", 20.0);
        p.discount_percentage = Some(25.0);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();
        cart
    }

    #[test]
    fn test_pricing_by_delivery() {
        let cart = cart_with_items();
        let mut checkout = Checkout::new();
        assert_eq!(checkout.pricing(&cart).unwrap().total, Money::usd(3000));

        checkout.set_delivery(DeliveryOption::Express);
        let pricing = checkout.pricing(&cart).unwrap();
        assert_eq!(pricing.subtotal, Money::usd(3000));
        assert_eq!(pricing.total, Money::usd(3499));
    }

    #[tokio::test]
    async fn test_pay_success_clears_cart() {
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.set_delivery(DeliveryOption::Express);

        let confirmation = checkout
            .pay(&mut cart, &form(), &SimulatedGateway::always_approve())
            .await
            .unwrap();

        assert_eq!(confirmation.amount, Money::usd(3499));
        assert_eq!(confirmation.delivery, DeliveryOption::Express);
        assert!(confirmation.order_number.as_str().starts_with("ORD-"));
        assert!(cart.is_empty());
        assert_eq!(checkout.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_declined_keeps_cart() {
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();

        let err = checkout
            .pay(&mut cart, &form(), &SimulatedGateway::always_decline())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Payment failed. Please try again.");
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(checkout.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_validation() {
        let mut cart = CartLedger::load(Cache::in_memory());
        let mut checkout = Checkout::new();

        let err = checkout
            .pay(&mut cart, &PaymentForm::default(), &SimulatedGateway::always_approve())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CartEmpty));
    }

    #[tokio::test]
    async fn test_invalid_form_does_not_charge() {
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        let rx = checkout.subscribe();
        let mut bad = form();
        bad.cvv = "1".to_string();

        let err = checkout
            .pay(&mut cart, &bad, &SimulatedGateway::always_approve())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidField { .. }));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(cart.total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_approved_charge_confirms_even_if_cart_save_fails() {
        let (cache, store) = switchable_cache();
        let mut cart = CartLedger::load(cache);
        cart.add(&product(1, "x", 12.0)).unwrap();
        store.set_read_only(true);

        let mut checkout = Checkout::new();
        let confirmation = checkout
            .pay(&mut cart, &form(), &SimulatedGateway::always_approve())
            .await
            .unwrap();

        assert_eq!(confirmation.amount, Money::usd(1200));
        assert_eq!(checkout.state(), CheckoutState::Idle);
        assert_eq!(cart.total_quantity(), 1);
    }
}
