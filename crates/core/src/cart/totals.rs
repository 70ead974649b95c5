//! Order totals derived from a cart snapshot.
//!
//! Totals are never stored. Every view recomputes them from the current line
//! items, so two surfaces showing the same cart always agree. Intermediate
//! values keep full precision; each presented figure is rounded once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::types::Money;

/// Sales tax applied to the subtotal (9.2%).
pub const TAX_RATE: Decimal = Decimal::from_parts(92, 0, 0, false, 3);

/// Shipping options offered at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Free, 3-7 business days.
    #[default]
    Standard,
    /// Flat fee, 1-3 business days.
    Express,
}

impl DeliveryMethod {
    /// Every option, in the order the checkout lists them.
    pub const ALL: [Self; 2] = [Self::Standard, Self::Express];

    /// Shipping charge for this option.
    #[must_use]
    pub const fn shipping(self) -> Money {
        match self {
            Self::Standard => Money::ZERO,
            Self::Express => Money::from_minor(1500),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Express => "Express",
        }
    }

    /// Expected delivery window.
    #[must_use]
    pub const fn turnaround(self) -> &'static str {
        match self {
            Self::Standard => "3-7 business days",
            Self::Express => "1-3 business days",
        }
    }

    /// Identifier used for the shipping line sent to the order API.
    #[must_use]
    pub const fn method_id(self) -> &'static str {
        match self {
            Self::Standard => "free_shipping",
            Self::Express => "flat_rate",
        }
    }
}

/// Totals for a cart, each rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub shipping: Money,
    pub grand_total: Money,
    pub delivery: DeliveryMethod,
    pub item_count: u32,
}

impl Totals {
    /// Compute totals for a sequence of line items.
    ///
    /// The tax is taken from the unrounded subtotal and the grand total from
    /// the unrounded subtotal and tax, so rounding happens exactly once per
    /// figure. An empty cart carries no shipping charge.
    #[must_use]
    pub fn calculate(items: &[LineItem], delivery: DeliveryMethod) -> Self {
        let subtotal: Money = items.iter().map(LineItem::line_total).sum();
        let tax = subtotal.times_rate(TAX_RATE);
        let shipping = if items.is_empty() {
            Money::ZERO
        } else {
            delivery.shipping()
        };
        let grand_total = subtotal + tax + shipping;
        let item_count = items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()));

        Self {
            subtotal: subtotal.rounded(),
            tax_rate: TAX_RATE,
            tax_amount: tax.rounded(),
            shipping: shipping.rounded(),
            grand_total: grand_total.rounded(),
            delivery,
            item_count,
        }
    }

    /// Totals of an empty cart.
    #[must_use]
    pub fn empty(delivery: DeliveryMethod) -> Self {
        Self::calculate(&[], delivery)
    }
}
