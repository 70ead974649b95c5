//! Order submission.
//!
//! Turns a validated checkout of the stored cart into an order on the
//! commerce backend and tracks progress with a [`SubmissionState`] kept in
//! the session.
//!
//! Exactly one order is created per successful submission. While a
//! submission is in flight the state is `submitting` and further submissions
//! are refused; across concurrent requests the HTTP layer also holds an
//! [`InFlightSubmissions`] slot. Each state change is committed to the
//! session store as it happens. The cart is cleared only after the backend accepts the order;
//! on failure it is left untouched so the customer can retry.

mod in_flight;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bloom_core::{
    CheckoutForm, Customer, DeliveryMethod, LineItem, OrderId, SubmissionState, Totals,
    TransitionError, ValidationErrors,
};

use crate::cart::{CartEvents, CheckoutStore, StoreError};
use crate::commerce::{CommerceError, NewOrder, OrderApi};

pub use in_flight::{InFlightSubmissions, SubmissionGuard};

/// What the thank-you page shows after a successful order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
    pub delivery: DeliveryMethod,
    pub items: Vec<LineItem>,
    pub customer: Customer,
    pub totals: Totals,
}

impl OrderConfirmation {
    /// Build a confirmation, recomputing totals from the purchased items.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        order_number: String,
        delivery: DeliveryMethod,
        items: Vec<LineItem>,
        customer: Customer,
    ) -> Self {
        let totals = Totals::calculate(&items, delivery);
        Self {
            order_id,
            order_number,
            delivery,
            items,
            customer,
            totals,
        }
    }
}

/// Why an order was not placed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form has errors. Nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Another submission for this session is still in flight.
    #[error(transparent)]
    AlreadySubmitting(#[from] TransitionError),

    /// The commerce backend did not accept the order. The cart is kept.
    #[error("order was not accepted: {0}")]
    Rejected(#[source] CommerceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Places orders for one visitor.
pub struct OrderSubmitter<'a> {
    store: &'a dyn CheckoutStore,
    api: &'a dyn OrderApi,
    events: &'a CartEvents,
}

impl<'a> OrderSubmitter<'a> {
    #[must_use]
    pub fn new(store: &'a dyn CheckoutStore, api: &'a dyn OrderApi, events: &'a CartEvents) -> Self {
        Self { store, api, events }
    }

    /// Current submission state.
    pub async fn state(&self) -> SubmissionState {
        self.store.submission_state().await
    }

    /// Validate the form and place an order for the stored cart.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Validation`] if the form is invalid (no order call is made)
    /// - [`SubmitError::EmptyCart`] if the cart has no lines
    /// - [`SubmitError::AlreadySubmitting`] if a submission is in flight
    /// - [`SubmitError::Rejected`] if the backend refused or could not be reached
    #[tracing::instrument(skip(self, form), fields(delivery = ?form.delivery))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<OrderConfirmation, SubmitError> {
        let checkout = form.validate()?;

        let cart = self.store.load().await;
        if cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }

        let submitting = self.store.submission_state().await.for_new_cart().begin()?;
        self.store.set_submission_state(&submitting).await?;
        self.store.commit().await?;

        let order = NewOrder::from_checkout(&cart, &checkout);
        match self.api.create_order(&order).await {
            Ok(receipt) => {
                let confirmation = OrderConfirmation::new(
                    receipt.id,
                    receipt.number,
                    checkout.delivery,
                    cart.into_items(),
                    checkout.customer,
                );

                let succeeded = submitting.succeed(receipt.id)?;
                self.store.save_confirmation(&confirmation).await?;
                self.store.clear().await?;
                self.store.set_submission_state(&succeeded).await?;
                self.store.commit().await?;
                self.events.notify();

                tracing::info!(order_id = %confirmation.order_id, "order placed");
                Ok(confirmation)
            }
            Err(e) => {
                tracing::warn!(error = %e, "order submission failed");
                let failed = submitting.fail(e.to_string())?;
                self.store.set_submission_state(&failed).await?;
                self.store.commit().await?;
                Err(SubmitError::Rejected(e))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use bloom_core::{
        Cart, CustomerForm, Email, Money, NewLineItem, OrderStatus, PaymentMethod, ProductId,
        Quantity, SelectedAttributes,
    };

    use super::*;
    use crate::cart::{CartStore, InMemorySession};
    use crate::commerce::{OrderReceipt, OrderSummary};
    use crate::models::session_keys;

    #[derive(Default)]
    struct FakeOrders {
        calls: AtomicUsize,
        fail: bool,
        last: Mutex<Option<NewOrder>>,
    }

    impl FakeOrders {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderApi for FakeOrders {
        async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, CommerceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = Some(order.clone());
            if self.fail {
                return Err(CommerceError::Api {
                    status: 503,
                    message: "maintenance".to_string(),
                });
            }
            Ok(OrderReceipt {
                id: OrderId::new(731),
                number: "731".to_string(),
                status: OrderStatus::Processing,
                total: Money::from_minor(6549),
            })
        }

        async fn list_orders(&self, _email: &Email) -> Result<Vec<OrderSummary>, CommerceError> {
            Ok(Vec::new())
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer: CustomerForm {
                first_name: "Ona".to_string(),
                last_name: "Petraitė".to_string(),
                address1: "Gedimino pr. 1".to_string(),
                city: "Vilnius".to_string(),
                postcode: "01103".to_string(),
                country: "LT".to_string(),
                email: "ona@example.com".to_string(),
                phone: "+370 600 12345".to_string(),
                ..CustomerForm::default()
            },
            payment_method: PaymentMethod::Paypal,
            ..CheckoutForm::default()
        }
    }

    async fn session_with_cart() -> InMemorySession {
        let session = InMemorySession::new();
        let mut cart = Cart::new();
        cart.add(
            NewLineItem {
                product_id: ProductId::new(12),
                name: "Linen Shirt".to_string(),
                unit_price: Money::from_minor(1999),
                image_url: String::new(),
                attributes: SelectedAttributes::default(),
            },
            Quantity::new(3).unwrap(),
        );
        session.save(&cart).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_keeps_confirmation() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();
        let submitter = OrderSubmitter::new(&session, &orders, &events);

        let confirmation = submitter.submit(&form()).await.unwrap();

        assert_eq!(orders.calls(), 1);
        assert_eq!(confirmation.order_id, OrderId::new(731));
        assert_eq!(confirmation.totals.grand_total, Money::from_minor(6549));
        assert!(session.load().await.is_empty());
        assert_eq!(session.confirmation().await, Some(confirmation));
        assert_eq!(
            submitter.state().await,
            SubmissionState::Succeeded {
                order_id: OrderId::new(731)
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_call() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();
        let submitter = OrderSubmitter::new(&session, &orders, &events);

        let mut invalid = form();
        invalid.customer.email = "not-an-email".to_string();
        let err = submitter.submit(&invalid).await.unwrap_err();

        assert!(matches!(err, SubmitError::Validation(ref e) if e.for_field("email").is_some()));
        assert_eq!(orders.calls(), 0);
        assert_eq!(submitter.state().await, SubmissionState::Idle);
        assert!(!session.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let session = InMemorySession::new();
        let orders = FakeOrders::default();
        let events = CartEvents::new();
        let submitter = OrderSubmitter::new(&session, &orders, &events);

        let err = submitter.submit(&form()).await.unwrap_err();

        assert!(matches!(err, SubmitError::EmptyCart));
        assert_eq!(orders.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_cart_and_allows_retry() {
        let session = session_with_cart().await;
        let events = CartEvents::new();

        let failing = FakeOrders::failing();
        let err = OrderSubmitter::new(&session, &failing, &events)
            .submit(&form())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(_)));
        assert!(!session.load().await.is_empty());
        assert!(matches!(
            session.submission_state().await,
            SubmissionState::Failed { .. }
        ));

        let working = FakeOrders::default();
        OrderSubmitter::new(&session, &working, &events)
            .submit(&form())
            .await
            .unwrap();
        assert_eq!(working.calls(), 1);
        assert!(session.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_state_is_committed() {
        let session = session_with_cart().await;
        let events = CartEvents::new();
        let failing = FakeOrders::failing();

        OrderSubmitter::new(&session, &failing, &events)
            .submit(&form())
            .await
            .unwrap_err();

        let committed = session.persisted(session_keys::CHECKOUT_STATE).unwrap();
        assert_eq!(committed["state"], "failed");
        assert!(session.persisted(session_keys::CART).is_some());
    }

    #[tokio::test]
    async fn test_success_is_committed() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();

        OrderSubmitter::new(&session, &orders, &events)
            .submit(&form())
            .await
            .unwrap();

        let committed = session.persisted(session_keys::CHECKOUT_STATE).unwrap();
        assert_eq!(committed["state"], "succeeded");
        assert!(session.persisted(session_keys::CART).is_none());
        assert!(session.persisted(session_keys::PURCHASED_PRODUCTS).is_some());
    }

    #[tokio::test]
    async fn test_in_flight_submission_is_refused() {
        let session = session_with_cart().await;
        session
            .set_submission_state(&SubmissionState::Submitting)
            .await
            .unwrap();
        let orders = FakeOrders::default();
        let events = CartEvents::new();

        let err = OrderSubmitter::new(&session, &orders, &events)
            .submit(&form())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::AlreadySubmitting(_)));
        assert_eq!(orders.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_order_after_success() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();
        let submitter = OrderSubmitter::new(&session, &orders, &events);
        submitter.submit(&form()).await.unwrap();

        let err = submitter.submit(&form()).await.unwrap_err();
        assert!(matches!(err, SubmitError::EmptyCart));

        let refilled = session_with_cart().await;
        session.save(&refilled.load().await).await.unwrap();
        submitter.submit(&form()).await.unwrap();
        assert_eq!(orders.calls(), 2);
    }

    #[tokio::test]
    async fn test_order_lines_mirror_cart() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();

        OrderSubmitter::new(&session, &orders, &events)
            .submit(&form())
            .await
            .unwrap();

        let sent = orders.last.lock().clone().unwrap();
        assert_eq!(sent.line_items.len(), 1);
        assert_eq!(sent.line_items[0].product_id, ProductId::new(12));
        assert_eq!(sent.line_items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_success_notifies_cart_views() {
        let session = session_with_cart().await;
        let orders = FakeOrders::default();
        let events = CartEvents::new();
        let notified = std::sync::Arc::new(AtomicUsize::new(0));
        let seen = std::sync::Arc::clone(&notified);
        let _sub = events.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        OrderSubmitter::new(&session, &orders, &events)
            .submit(&form())
            .await
            .unwrap();

        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }
}
