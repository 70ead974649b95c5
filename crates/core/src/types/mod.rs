//! Core types for Bloom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use status::*;
