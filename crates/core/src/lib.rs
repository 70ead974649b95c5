//! Bloom Core - Shared domain library.
//!
//! This crate provides the types and pure logic shared by all Bloom components:
//! - `storefront` - Public-facing e-commerce site
//! - `cli` - Command-line tools for migrations, quoting and order lookups
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no session
//! access, no HTTP clients. Cart totals and checkout validation live here so
//! every surface that shows a cart computes exactly the same numbers.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`cart`] - Line items, the cart sequence, and the totals calculator
//! - [`checkout`] - Checkout form validation and the submission state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{
    Cart, CartError, DeliveryMethod, LineItem, NewLineItem, Quantity, SelectedAttributes, Totals,
};
pub use checkout::{
    CheckoutForm, Customer, CustomerForm, FieldError, PaymentForm, PaymentMethod,
    SubmissionState, TransitionError, ValidatedCheckout, ValidationErrors,
};
pub use types::*;
