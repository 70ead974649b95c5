//! Session cart: persistence, mutations, and the `cart-updated` signal.

pub mod events;
pub mod service;
pub mod store;

pub use events::{CART_UPDATED, CartEvents, Subscription};
pub use service::{CartService, CartSnapshot, CartUpdateError};
pub use store::{CartStore, CheckoutStore, InMemorySession, SessionBackend, StoreError};
