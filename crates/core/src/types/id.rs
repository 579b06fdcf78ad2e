//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers. Use the `define_id!` macro
//! to wrap them so a `BrandId` can never be passed where a `ProductId` is
//! expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use emporium_core::define_id;
/// define_id!(OrderId);
/// define_id!(InvoiceId);
///
/// let order_id = OrderId::new("ord_1");
/// let invoice_id = InvoiceId::new("ord_1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = invoice_id;
/// # let _ = (order_id, invoice_id);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(BrandId);
define_id!(CategoryId);
define_id!(CartId);
define_id!(UserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::new("p_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p_42\"");

        let parsed: ProductId = serde_json::from_str("\"p_42\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display() {
        let id = BrandId::from("acme");
        assert_eq!(id.to_string(), "acme");
        assert_eq!(id.as_str(), "acme");
    }
}
