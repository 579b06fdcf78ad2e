//! Admin catalog forms: products, brands and categories.

use std::str::FromStr;

use emporium_core::{
    Brand, BrandId, BrandInput, Category, CategoryId, CategoryInput, Product, ProductInput,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    FieldErrors, Validate, is_http_url, optional_text, optional_url, required_text,
    slug_or_derived,
};

const MAX_DESCRIPTION_LENGTH: usize = 500;
const MAX_PRODUCT_DESCRIPTION_LENGTH: usize = 5000;
const MAX_IMAGES: usize = 10;

/// Product create/edit form data.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub brand_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// One image URL per line.
    #[serde(default)]
    pub images: Option<String>,
    /// Checkbox: present ("on") when checked.
    #[serde(default)]
    pub is_active: Option<String>,
}

impl Validate for ProductForm {
    type Output = ProductInput;

    fn validate(&self) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, 2, 120);
        let slug = slug_or_derived(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            MAX_PRODUCT_DESCRIPTION_LENGTH,
        );
        let price = money(&mut errors, "price", &self.price).unwrap_or_default();
        let compare_at_price = self
            .compare_at_price
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|raw| money(&mut errors, "compare_at_price", raw));
        if let Some(compare) = compare_at_price
            && compare <= price
        {
            errors.add("compare_at_price", "Must be greater than the price");
        }

        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw.parse::<u32>().unwrap_or_else(|_| {
                errors.add("stock", "Must be a whole number of 0 or more");
                0
            }),
        };

        let images: Vec<String> = self
            .images
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if images.len() > MAX_IMAGES {
            errors.add("images", format!("At most {MAX_IMAGES} images"));
        }
        if let Some(bad) = images.iter().find(|u| !is_http_url(u)) {
            errors.add("images", format!("Not an http(s) URL: {bad}"));
        }

        errors.into_result(ProductInput {
            name,
            slug,
            description,
            price,
            compare_at_price,
            stock,
            brand_id: non_blank(self.brand_id.as_deref()).map(BrandId::new),
            category_id: non_blank(self.category_id.as_deref()).map(CategoryId::new),
            images,
            is_active: self.is_active.is_some(),
        })
    }
}

/// Brand create/edit form data.
#[derive(Debug, Default, Deserialize)]
pub struct BrandForm {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Validate for BrandForm {
    type Output = BrandInput;

    fn validate(&self) -> Result<BrandInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 2, 80);
        let slug = slug_or_derived(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        );
        let logo_url = optional_url(&mut errors, "logo_url", self.logo_url.as_deref());

        errors.into_result(BrandInput {
            name,
            slug,
            description,
            logo_url,
        })
    }
}

/// Category create/edit form data.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl CategoryForm {
    /// Validate, additionally rejecting a category that is its own parent.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for every invalid field.
    pub fn validate_for(&self, id: Option<&CategoryId>) -> Result<CategoryInput, FieldErrors> {
        let input = self.validate()?;
        if let (Some(id), Some(parent)) = (id, input.parent_id.as_ref())
            && id == parent
        {
            let mut errors = FieldErrors::new();
            errors.add("parent_id", "A category cannot be its own parent");
            return Err(errors);
        }
        Ok(input)
    }
}

impl Validate for CategoryForm {
    type Output = CategoryInput;

    fn validate(&self) -> Result<CategoryInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 2, 80);
        let slug = slug_or_derived(&mut errors, self.slug.as_deref(), &name);
        let description = optional_text(
            &mut errors,
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
        );

        errors.into_result(CategoryInput {
            name,
            slug,
            description,
            parent_id: non_blank(self.parent_id.as_deref()).map(CategoryId::new),
        })
    }
}

// =============================================================================
// Edit-page prefill
// =============================================================================

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: Some(product.slug.clone()),
            description: product.description.clone(),
            price: product.price.to_string(),
            compare_at_price: product.compare_at_price.map(|c| c.to_string()),
            stock: product.stock.to_string(),
            brand_id: product.brand.as_ref().map(|b| b.id.to_string()),
            category_id: product.category.as_ref().map(|c| c.id.to_string()),
            images: Some(product.images.join("\n")),
            is_active: product.is_active.then(|| "on".to_string()),
        }
    }
}

impl From<&Brand> for BrandForm {
    fn from(brand: &Brand) -> Self {
        Self {
            name: brand.name.clone(),
            slug: Some(brand.slug.clone()),
            description: brand.description.clone(),
            logo_url: brand.logo_url.clone(),
        }
    }
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: Some(category.slug.clone()),
            description: category.description.clone(),
            parent_id: category.parent_id.as_ref().map(ToString::to_string),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a positive amount with at most two decimal places.
fn money(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<Decimal> {
    let raw = raw.trim().trim_start_matches('$');
    if raw.is_empty() {
        errors.add(field, "This field is required");
        return None;
    }
    match Decimal::from_str(raw) {
        Ok(amount) if amount <= Decimal::ZERO => {
            errors.add(field, "Must be greater than zero");
            None
        }
        Ok(amount) if amount.normalize().scale() > 2 => {
            errors.add(field, "Use at most two decimal places");
            None
        }
        Ok(amount) => Some(amount),
        Err(_) => {
            errors.add(field, "Enter a number like 19.99");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> ProductForm {
        ProductForm {
            name: "Ceramic Mug".to_string(),
            price: "12.50".to_string(),
            stock: "8".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_product_minimal_valid() {
        let input = product().validate().unwrap();
        assert_eq!(input.slug, "ceramic-mug");
        assert_eq!(input.price, Decimal::new(1250, 2));
        assert_eq!(input.stock, 8);
        assert!(!input.is_active);
        assert!(input.images.is_empty());
        assert!(input.brand_id.is_none());
    }

    #[test]
    fn test_product_full_valid() {
        let form = ProductForm {
            compare_at_price: Some("15".to_string()),
            brand_id: Some("b1".to_string()),
            category_id: Some(" ".to_string()),
            images: Some("https://cdn.example.com/a.jpg\n\n https://cdn.example.com/b.jpg ".to_string()),
            is_active: Some("on".to_string()),
            ..product()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.compare_at_price, Some(Decimal::new(15, 0)));
        assert_eq!(input.brand_id, Some(BrandId::new("b1")));
        assert!(input.category_id.is_none());
        assert_eq!(input.images.len(), 2);
        assert!(input.is_active);
    }

    #[test]
    fn test_product_price_rules() {
        for (raw, message) in [
            ("", "This field is required"),
            ("0", "Must be greater than zero"),
            ("1.999", "Use at most two decimal places"),
            ("abc", "Enter a number like 19.99"),
        ] {
            let form = ProductForm {
                price: raw.to_string(),
                ..product()
            };
            assert_eq!(form.validate().unwrap_err().first("price"), Some(message), "{raw}");
        }

        let form = ProductForm {
            price: "$9.90".to_string(),
            ..product()
        };
        assert_eq!(form.validate().unwrap().price, Decimal::new(990, 2));
    }

    #[test]
    fn test_product_compare_at_must_exceed_price() {
        let form = ProductForm {
            compare_at_price: Some("12.50".to_string()),
            ..product()
        };
        assert!(form.validate().unwrap_err().contains("compare_at_price"));
    }

    #[test]
    fn test_product_rejects_bad_stock_and_images() {
        let form = ProductForm {
            stock: "-3".to_string(),
            images: Some("ftp://files.example.com/x.png".to_string()),
            ..product()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.contains("stock"));
        assert!(errors.contains("images"));
    }

    #[test]
    fn test_brand_form() {
        let form = BrandForm {
            name: "Acme Tools".to_string(),
            logo_url: Some("https://cdn.example.com/acme.svg".to_string()),
            ..BrandForm::default()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.slug, "acme-tools");

        let form = BrandForm {
            name: "Acme".to_string(),
            logo_url: Some("acme.svg".to_string()),
            ..BrandForm::default()
        };
        assert!(form.validate().unwrap_err().contains("logo_url"));
    }

    #[test]
    fn test_product_prefill_validates_back() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Ceramic Mug",
            "slug": "ceramic-mug",
            "price": 12.5,
            "compareAtPrice": 15,
            "stock": 4,
            "images": ["https://cdn.example.com/mug.jpg"],
            "isActive": false,
        }))
        .unwrap();
        let form = ProductForm::from(&product);
        assert!(form.is_active.is_none());

        let input = form.validate().unwrap();
        assert_eq!(input.slug, "ceramic-mug");
        assert_eq!(input.price, Decimal::new(125, 1));
        assert_eq!(input.images, product.images);
        assert!(!input.is_active);
    }

    #[test]
    fn test_category_cannot_parent_itself() {
        let form = CategoryForm {
            name: "Kitchen".to_string(),
            parent_id: Some("c1".to_string()),
            ..CategoryForm::default()
        };
        let id = CategoryId::new("c1");
        assert!(form.validate_for(Some(&id)).unwrap_err().contains("parent_id"));
        assert!(form.validate_for(Some(&CategoryId::new("c2"))).is_ok());
        assert!(form.validate_for(None).is_ok());
    }
}
