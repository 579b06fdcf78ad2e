//! Cart forms.

use emporium_core::ProductId;
use serde::Deserialize;

use super::{FieldErrors, Validate};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub product_id: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

impl Validate for CartItemForm {
    type Output = (ProductId, u32);

    fn validate(&self) -> Result<(ProductId, u32), FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = product_id(&mut errors, &self.product_id);
        let quantity = match self.quantity.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => quantity(&mut errors, raw, 1),
        };
        errors.into_result((product_id, quantity))
    }
}

/// Quantity update form data. A quantity of 0 removes the line.
#[derive(Debug, Deserialize)]
pub struct CartQuantityForm {
    pub product_id: String,
    pub quantity: String,
}

impl Validate for CartQuantityForm {
    type Output = (ProductId, u32);

    fn validate(&self) -> Result<(ProductId, u32), FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = product_id(&mut errors, &self.product_id);
        let quantity = quantity(&mut errors, self.quantity.trim(), 0);
        errors.into_result((product_id, quantity))
    }
}

/// Remove-from-cart form data.
#[derive(Debug, Deserialize)]
pub struct CartRemoveForm {
    pub product_id: String,
}

impl Validate for CartRemoveForm {
    type Output = ProductId;

    fn validate(&self) -> Result<ProductId, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = product_id(&mut errors, &self.product_id);
        errors.into_result(product_id)
    }
}

fn product_id(errors: &mut FieldErrors, raw: &str) -> ProductId {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("product_id", "Missing product");
    }
    ProductId::new(raw)
}

fn quantity(errors: &mut FieldErrors, raw: &str, min: u32) -> u32 {
    match raw.parse::<u32>() {
        Ok(q) if (min..=MAX_LINE_QUANTITY).contains(&q) => q,
        _ => {
            errors.add(
                "quantity",
                format!("Quantity must be between {min} and {MAX_LINE_QUANTITY}"),
            );
            min
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_defaults_to_one() {
        let form = CartItemForm {
            product_id: "p1".to_string(),
            quantity: None,
        };
        assert_eq!(form.validate().unwrap(), (ProductId::new("p1"), 1));
    }

    #[test]
    fn test_add_rejects_zero_and_overflow() {
        for raw in ["0", "100", "-1", "two"] {
            let form = CartItemForm {
                product_id: "p1".to_string(),
                quantity: Some(raw.to_string()),
            };
            assert!(form.validate().unwrap_err().contains("quantity"), "{raw}");
        }
    }

    #[test]
    fn test_update_allows_zero() {
        let form = CartQuantityForm {
            product_id: "p1".to_string(),
            quantity: "0".to_string(),
        };
        assert_eq!(form.validate().unwrap().1, 0);
    }

    #[test]
    fn test_missing_product() {
        let form = CartRemoveForm {
            product_id: "  ".to_string(),
        };
        assert!(form.validate().unwrap_err().contains("product_id"));
    }
}
