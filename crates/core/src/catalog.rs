//! Catalog records: products, brands and categories.
//!
//! These mirror the backend's JSON resources one to one. The storefront only
//! reads them for display and sends the matching `*Input` records back when
//! an admin edits the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId, ProductId};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: Option<BrandRef>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// First image, used as the listing thumbnail.
    #[must_use]
    pub fn featured_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product is discounted against its compare-at price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_at_price.is_some_and(|c| c > self.price)
    }
}

const fn default_true() -> bool {
    true
}

/// Brand summary embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRef {
    pub id: BrandId,
    pub name: String,
}

/// Category summary embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub product_count: Option<u32>,
}

/// A product category. Categories may nest one level via `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub product_count: Option<u32>,
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock: u32,
    pub brand_id: Option<BrandId>,
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    pub is_active: bool,
}

/// Body for creating or replacing a brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Body for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
}

/// Sort orders supported by the product listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// Query-string value understood by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    /// Parse a query-string value, falling back to the default order.
    #[must_use]
    pub fn from_query(s: Option<&str>) -> Self {
        match s {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("name") => Self::Name,
            _ => Self::Newest,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_minimal_record() {
        let json = r#"{"id":"p1","name":"Desk Lamp","slug":"desk-lamp","price":24.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Decimal::new(245, 1));
        assert!(product.is_active);
        assert!(!product.in_stock());
        assert!(product.featured_image().is_none());
        assert!(product.brand.is_none());
    }

    #[test]
    fn test_product_deserializes_full_record() {
        let json = r#"{
            "id": "p2",
            "name": "Kettle",
            "slug": "kettle",
            "description": "Boils water",
            "price": "30.00",
            "compareAtPrice": "45.00",
            "stock": 3,
            "images": ["https://cdn.example.com/k.jpg"],
            "brand": {"id": "b1", "name": "Acme"},
            "category": {"id": "c1", "name": "Kitchen"},
            "isActive": false,
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert!(product.on_sale());
        assert!(product.in_stock());
        assert!(!product.is_active);
        assert_eq!(product.featured_image(), Some("https://cdn.example.com/k.jpg"));
        assert_eq!(product.brand.unwrap().name, "Acme");
    }

    #[test]
    fn test_product_input_serializes_camel_case() {
        let input = ProductInput {
            name: "Mug".to_string(),
            slug: "mug".to_string(),
            description: None,
            price: Decimal::new(1200, 2),
            compare_at_price: None,
            stock: 10,
            brand_id: Some(BrandId::new("b1")),
            category_id: None,
            images: vec![],
            is_active: true,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["brandId"], "b1");
        assert_eq!(value["isActive"], true);
        assert!(value.get("brand_id").is_none());
    }

    #[test]
    fn test_sort_from_query() {
        assert_eq!(ProductSort::from_query(Some("price_desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::from_query(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::from_query(None).as_str(), "newest");
    }
}
