//! The shopping cart: an ordered sequence of line items.
//!
//! Display order is insertion order. Adding the same product twice creates two
//! separate lines; nothing is merged. Lines are addressed by their
//! [`LineItemId`], never by position.

mod totals;

pub use totals::{DeliveryMethod, TAX_RATE, Totals};

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{LineItemId, Money, ProductId};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantities start at one; zero-quantity lines never exist.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// The line was removed (possibly from another tab) or never existed.
    #[error("line item not found: {0}")]
    LineNotFound(LineItemId),
}

/// Number of units on a cart line. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit, the default for add-to-cart.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Largest quantity the quantity picker offers.
    pub const MAX_SELECTABLE: u32 = 10;

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero.
    pub fn new(value: u32) -> Result<Self, CartError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(CartError::InvalidQuantity(value))
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether the quantity picker offers this value (1..=10).
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        self.0.get() <= Self::MAX_SELECTABLE
    }

    /// The values offered by the quantity picker.
    pub fn selectable() -> impl Iterator<Item = Self> {
        (1..=Self::MAX_SELECTABLE).filter_map(|n| Self::new(n).ok())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CartError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

/// Variant choices made on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedAttributes {
    pub color: Option<String>,
    pub size: Option<String>,
}

/// The product data needed to put something in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub image_url: String,
    pub attributes: SelectedAttributes,
}

/// One entry in the cart.
///
/// Field aliases accept the older persisted layout (`price`, `image`,
/// `attributes`, no `id`) so carts written before line ids existed still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default = "LineItemId::generate")]
    pub id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Money,
    pub quantity: Quantity,
    #[serde(default, alias = "image")]
    pub image_url: String,
    #[serde(default, alias = "attributes")]
    pub selected_attributes: SelectedAttributes,
}

impl LineItem {
    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity.get()
    }
}

/// The cart contents for one browsing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from already-stored items.
    #[must_use]
    pub const fn from_items(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consume the cart, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines (the header badge number).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }

    /// Look up a line.
    #[must_use]
    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Current display position of a line.
    #[must_use]
    pub fn position(&self, id: LineItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Append a new line at the end and return its id.
    pub fn add(&mut self, product: NewLineItem, quantity: Quantity) -> LineItemId {
        let id = LineItemId::generate();
        self.items.push(LineItem {
            id,
            product_id: product.product_id,
            name: product.name,
            unit_price: product.unit_price,
            quantity,
            image_url: product.image_url,
            selected_attributes: product.attributes,
        });
        id
    }

    /// Replace the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id.
    pub fn set_quantity(&mut self, id: LineItemId, quantity: Quantity) -> Result<(), CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::LineNotFound(id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line; later lines move up one position.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id.
    pub fn remove(&mut self, id: LineItemId) -> Result<LineItem, CartError> {
        let index = self.position(id).ok_or(CartError::LineNotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Recompute totals from the current contents.
    #[must_use]
    pub fn totals(&self, delivery: DeliveryMethod) -> Totals {
        Totals::calculate(&self.items, delivery)
    }
}
