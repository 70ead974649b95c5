//! Per-visitor cart and checkout persistence.
//!
//! Everything is kept as JSON values in the visitor's session. The typed
//! stores ([`CartStore`], [`CheckoutStore`]) are implemented once for any
//! [`SessionBackend`]: the tower-sessions [`Session`] in production and
//! [`InMemorySession`] in tests.
//!
//! Reads never fail. A missing or unreadable value is treated as absent and
//! logged, so a corrupted session never takes a page down.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tower_sessions::Session;

use bloom_core::{Cart, Customer, DeliveryMethod, LineItem, OrderId, SubmissionState};

use crate::checkout::OrderConfirmation;
use crate::models::session_keys;

/// Errors raised while writing session state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw key/value access to a visitor's session.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn read_value(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn write_value(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn delete_value(&self, key: &str) -> Result<(), StoreError>;

    /// Write pending changes through to the backing store now rather than
    /// when the response is sent.
    async fn persist(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl SessionBackend for Session {
    async fn read_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get_value(key).await?)
    }

    async fn write_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.insert_value(key, value).await?;
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> Result<(), StoreError> {
        self.remove_value(key).await?;
        Ok(())
    }

    // The session layer does not save on 5xx responses.
    async fn persist(&self) -> Result<(), StoreError> {
        Session::save(self).await?;
        Ok(())
    }
}

/// Session stand-in backed by a map, for tests and offline tooling.
#[derive(Debug, Default)]
pub struct InMemorySession {
    values: Mutex<HashMap<String, Value>>,
    persisted: Mutex<HashMap<String, Value>>,
}

impl InMemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing the typed stores.
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_owned(), value);
    }

    /// Raw value currently stored under a key.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    /// Raw value as of the last [`SessionBackend::persist`].
    #[must_use]
    pub fn persisted(&self, key: &str) -> Option<Value> {
        self.persisted.lock().get(key).cloned()
    }
}

#[async_trait]
impl SessionBackend for InMemorySession {
    async fn read_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.raw(key))
    }

    async fn write_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.insert_raw(key, value);
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.values.lock().clone();
        *self.persisted.lock() = snapshot;
        Ok(())
    }
}

/// Read a typed value, treating unreadable data as absent.
async fn read<T, B>(backend: &B, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    B: SessionBackend + ?Sized,
{
    let value = match backend.read_value(key).await {
        Ok(value) => value?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read session value");
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable session value");
            None
        }
    }
}

async fn write<T, B>(backend: &B, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + Sync + ?Sized,
    B: SessionBackend + ?Sized,
{
    backend.write_value(key, serde_json::to_value(value)?).await
}

/// Persistence for the cart line items.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The stored cart, or an empty cart if nothing usable is stored.
    async fn load(&self) -> Cart;

    /// Replace the stored cart.
    async fn save(&self, cart: &Cart) -> Result<(), StoreError>;

    /// Remove the stored cart.
    async fn clear(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<B: SessionBackend> CartStore for B {
    async fn load(&self) -> Cart {
        read(self, session_keys::CART).await.unwrap_or_default()
    }

    async fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        write(self, session_keys::CART, cart).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.delete_value(session_keys::CART).await
    }
}

/// The half of a confirmation stored under `purchased_products`.
#[derive(Debug, Serialize, Deserialize)]
struct PurchasedProducts {
    order_id: OrderId,
    order_number: String,
    delivery: DeliveryMethod,
    items: Vec<LineItem>,
}

/// Persistence for checkout progress and the last confirmation.
#[async_trait]
pub trait CheckoutStore: CartStore {
    async fn submission_state(&self) -> SubmissionState;

    async fn set_submission_state(&self, state: &SubmissionState) -> Result<(), StoreError>;

    /// Keep the purchased items and customer details for the thank-you view.
    async fn save_confirmation(&self, confirmation: &OrderConfirmation) -> Result<(), StoreError>;

    /// The last saved confirmation, if both halves are present and readable.
    async fn confirmation(&self) -> Option<OrderConfirmation>;

    /// Make checkout progress durable before the response goes out.
    async fn commit(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<B: SessionBackend> CheckoutStore for B {
    async fn submission_state(&self) -> SubmissionState {
        read(self, session_keys::CHECKOUT_STATE)
            .await
            .unwrap_or_default()
    }

    async fn set_submission_state(&self, state: &SubmissionState) -> Result<(), StoreError> {
        write(self, session_keys::CHECKOUT_STATE, state).await
    }

    async fn save_confirmation(&self, confirmation: &OrderConfirmation) -> Result<(), StoreError> {
        let purchased = PurchasedProducts {
            order_id: confirmation.order_id,
            order_number: confirmation.order_number.clone(),
            delivery: confirmation.delivery,
            items: confirmation.items.clone(),
        };
        write(self, session_keys::PURCHASED_PRODUCTS, &purchased).await?;
        write(self, session_keys::CUSTOMER_DATA, &confirmation.customer).await
    }

    async fn confirmation(&self) -> Option<OrderConfirmation> {
        let purchased: PurchasedProducts = read(self, session_keys::PURCHASED_PRODUCTS).await?;
        let customer: Customer = read(self, session_keys::CUSTOMER_DATA).await?;
        Some(OrderConfirmation::new(
            purchased.order_id,
            purchased.order_number,
            purchased.delivery,
            purchased.items,
            customer,
        ))
    }

    async fn commit(&self) -> Result<(), StoreError> {
        self.persist().await
    }
}
