//! Session-stored models for the storefront.
//!
//! Products and orders live in the external content and commerce APIs; the
//! storefront only keeps per-visitor state in the session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
