//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use serde::{Deserialize, Serialize};

use bloom_core::Email;

/// Session-stored identity of the signed-in customer.
///
/// Populated from the Google profile on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Provider account ID.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Verified email address, used to prefill checkout.
    pub email: Email,
    /// Avatar URL.
    pub picture: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for the cart line items (JSON array).
    pub const CART: &str = "cart";

    /// Key for the items and delivery of the last confirmed order.
    pub const PURCHASED_PRODUCTS: &str = "purchased_products";

    /// Key for the customer details of the last confirmed order.
    pub const CUSTOMER_DATA: &str = "customer_data";

    /// Key for the order submission state.
    pub const CHECKOUT_STATE: &str = "checkout_state";

    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}
