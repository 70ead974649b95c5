//! Wire types for the commerce REST API (`wc/v3`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use bloom_core::{
    Cart, Customer, DeliveryMethod, Money, OrderId, OrderStatus, ProductId, ValidatedCheckout,
};

/// Payment method recorded on every storefront order. Card details never
/// leave the storefront; the order is settled offline.
pub const PAYMENT_METHOD: &str = "cod";
pub const PAYMENT_METHOD_TITLE: &str = "Cash on Delivery";

/// Billing or shipping address as the API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub postcode: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// Billing address, which carries the contact details.
    #[must_use]
    pub fn billing(customer: &Customer) -> Self {
        Self {
            email: Some(customer.email.to_string()),
            phone: Some(customer.phone.clone()),
            ..Self::shipping(customer)
        }
    }

    /// Shipping address.
    #[must_use]
    pub fn shipping(customer: &Customer) -> Self {
        Self {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            address_1: customer.address1.clone(),
            address_2: customer.address2.clone().unwrap_or_default(),
            city: customer.city.clone(),
            state: customer.region.clone().unwrap_or_default(),
            postcode: customer.postcode.clone(),
            country: customer.country.clone(),
            email: None,
            phone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLine {
    pub method_id: &'static str,
    pub method_title: &'static str,
    pub total: String,
}

impl From<DeliveryMethod> for ShippingLine {
    fn from(delivery: DeliveryMethod) -> Self {
        Self {
            method_id: delivery.method_id(),
            method_title: delivery.title(),
            total: delivery.shipping().rounded().amount().to_string(),
        }
    }
}

/// Body of `POST orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub payment_method: &'static str,
    pub payment_method_title: &'static str,
    pub set_paid: bool,
    pub billing: Address,
    pub shipping: Address,
    pub line_items: Vec<NewLineItem>,
    pub shipping_lines: Vec<ShippingLine>,
}

impl NewOrder {
    /// Build the order for a validated checkout of a cart.
    ///
    /// Each cart line becomes one order line; lines for the same product are
    /// not merged.
    #[must_use]
    pub fn from_checkout(cart: &Cart, checkout: &ValidatedCheckout) -> Self {
        Self {
            payment_method: PAYMENT_METHOD,
            payment_method_title: PAYMENT_METHOD_TITLE,
            set_paid: true,
            billing: Address::billing(&checkout.customer),
            shipping: Address::shipping(&checkout.customer),
            line_items: cart
                .items()
                .iter()
                .map(|item| NewLineItem {
                    product_id: item.product_id,
                    quantity: item.quantity.get(),
                })
                .collect(),
            shipping_lines: vec![ShippingLine::from(checkout.delivery)],
        }
    }
}

/// The part of a created order the storefront needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderImage {
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub image: Option<OrderImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContact {
    #[serde(default)]
    pub email: String,
}

/// One entry of the customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub number: String,
    pub date_created: NaiveDateTime,
    pub total: Money,
    #[serde(default)]
    pub currency_symbol: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub line_items: Vec<OrderLine>,
    #[serde(default, skip_serializing)]
    pub billing: Option<BillingContact>,
}

impl OrderSummary {
    /// Whether the order was placed with this billing email.
    #[must_use]
    pub fn placed_by(&self, email: &str) -> bool {
        self.billing
            .as_ref()
            .is_some_and(|b| b.email.eq_ignore_ascii_case(email))
    }
}

/// Error body returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
