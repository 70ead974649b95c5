//! Cart mutations.
//!
//! Each operation is a full read-modify-write of the stored cart: load,
//! change, save, then notify. Totals are recomputed from the saved cart and
//! returned to the caller. There is no locking; concurrent writers from other
//! tabs follow last-write-wins.

use serde::Serialize;
use thiserror::Error;

use bloom_core::{
    Cart, CartError, DeliveryMethod, LineItem, LineItemId, NewLineItem, Quantity, Totals,
};

use super::events::CartEvents;
use super::store::{CartStore, StoreError};

/// Failure of a cart mutation.
#[derive(Debug, Error)]
pub enum CartUpdateError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cart contents with freshly computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

impl CartSnapshot {
    #[must_use]
    pub fn of(cart: &Cart, delivery: DeliveryMethod) -> Self {
        Self {
            items: cart.items().to_vec(),
            totals: cart.totals(delivery),
        }
    }
}

/// Cart operations over one visitor's store.
pub struct CartService<'a> {
    store: &'a dyn CartStore,
    events: &'a CartEvents,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub fn new(store: &'a dyn CartStore, events: &'a CartEvents) -> Self {
        Self { store, events }
    }

    /// Current cart with totals for the given delivery method.
    pub async fn snapshot(&self, delivery: DeliveryMethod) -> CartSnapshot {
        CartSnapshot::of(&self.store.load().await, delivery)
    }

    /// Number of units in the cart (the header badge).
    pub async fn item_count(&self) -> u32 {
        self.store.load().await.item_count()
    }

    /// Append a product as a new line. Repeated adds of the same product
    /// create separate lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_item(
        &self,
        product: NewLineItem,
        quantity: Quantity,
    ) -> Result<(LineItemId, CartSnapshot), CartUpdateError> {
        let mut cart = self.store.load().await;
        let id = cart.add(product, quantity);
        let snapshot = self.commit(&cart).await?;
        tracing::debug!(line_id = %id, lines = cart.len(), "line added");
        Ok((id, snapshot))
    }

    /// Replace the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown line, or an error if
    /// the cart cannot be saved.
    #[tracing::instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        line: LineItemId,
        quantity: Quantity,
    ) -> Result<CartSnapshot, CartUpdateError> {
        let mut cart = self.store.load().await;
        cart.set_quantity(line, quantity)?;
        self.commit(&cart).await
    }

    /// Remove a line. Later lines move up one position.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown line, or an error if
    /// the cart cannot be saved.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, line: LineItemId) -> Result<CartSnapshot, CartUpdateError> {
        let mut cart = self.store.load().await;
        cart.remove(line)?;
        self.commit(&cart).await
    }

    async fn commit(&self, cart: &Cart) -> Result<CartSnapshot, CartUpdateError> {
        self.store.save(cart).await?;
        self.events.notify();
        Ok(CartSnapshot::of(cart, DeliveryMethod::default()))
    }
}
