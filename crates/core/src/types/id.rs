//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe wrappers around the integer
//! keys handed out by the catalog and commerce backends, so a product key can
//! never be passed where an order key is expected.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe integer ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use bloom_core::define_id;
/// define_id!(WarehouseId);
/// define_id!(ShipmentId);
///
/// let warehouse = WarehouseId::new(1);
/// let shipment = ShipmentId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WarehouseId = shipment;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Catalog key (`databaseId` in the content API, `product_id` in the order API)
define_id!(ProductId);
// Order number assigned by the commerce backend
define_id!(OrderId);

/// Stable identifier for a single cart line.
///
/// Generated when the line is added and never reused, so a mutation aimed at
/// a line that another tab already removed fails instead of hitting whatever
/// item slid into its old position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(Uuid);

impl LineItemId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LineItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_serializes_as_plain_integer() {
        let id = ProductId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_line_item_ids_are_unique() {
        assert_ne!(LineItemId::generate(), LineItemId::generate());
    }

    #[test]
    fn test_line_item_id_parse_display() {
        let id = LineItemId::generate();
        let parsed: LineItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<LineItemId>().is_err());
    }
}
