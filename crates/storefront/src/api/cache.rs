//! Cache types for backend API responses.

use emporium_core::{
    Brand, BrandId, Category, CategoryId, Page, Product, ProductId, ProductSort, SessionToken,
    UserId,
};

/// Parameters of a product listing request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
    pub sort: ProductSort,
    /// Include unpublished products (admin listings only).
    pub include_inactive: bool,
}

impl ProductQuery {
    /// First page of active products in default order.
    #[must_use]
    pub fn first_page(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
            brand: None,
            category: None,
            sort: ProductSort::default(),
            include_inactive: false,
        }
    }

    /// Only public, non-search listings are shared across visitors.
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        self.search.is_none() && !self.include_inactive
    }

    /// Query-string pairs sent to the backend.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.as_str().to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.to_string()));
        }
        if self.include_inactive {
            pairs.push(("includeInactive", "true".to_string()));
        }
        pairs
    }
}

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
    Brand(BrandId),
    Brands,
    Category(CategoryId),
    Categories,
}

/// Cached catalog values.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
    Brand(Box<Brand>),
    Brands(Vec<Brand>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}

/// Cache key for carts: whose cart it is, without credentials.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CartKey {
    User(UserId),
    Guest(SessionToken),
}
