//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{BrandId, CategoryId, ProductId, ProductSort};

use crate::api::ProductQuery;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::views::{Layout, Pagination, ProductView, SelectOption};

/// Related products shown under a product.
const RELATED_PRODUCTS: u32 = 4;

/// Listing query parameters. Blank values mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl ListingQuery {
    /// Convert to a backend query with the given page size.
    #[must_use]
    pub fn to_product_query(&self, limit: u32) -> ProductQuery {
        ProductQuery {
            page: self.page.unwrap_or(1).max(1),
            limit,
            search: non_blank(self.search.as_deref()),
            brand: non_blank(self.brand.as_deref()).map(BrandId::new),
            category: non_blank(self.category.as_deref()).map(CategoryId::new),
            sort: ProductSort::from_query(self.sort.as_deref()),
            include_inactive: false,
        }
    }
}

/// Query-string pairs that pagination links carry forward.
pub(crate) fn filter_params(query: &ProductQuery) -> Vec<(&'static str, String)> {
    vec![
        ("search", query.search.clone().unwrap_or_default()),
        (
            "brand",
            query.brand.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
        (
            "category",
            query
                .category
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        ),
        ("sort", query.sort.as_str().to_string()),
    ]
}

fn sort_options(current: ProductSort) -> Vec<SelectOption> {
    [
        (ProductSort::Newest, "Newest"),
        (ProductSort::PriceAsc, "Price: low to high"),
        (ProductSort::PriceDesc, "Price: high to low"),
        (ProductSort::Name, "Name"),
    ]
    .into_iter()
    .map(|(sort, label)| SelectOption::new(sort.as_str(), label, sort == current))
    .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
    pub search: String,
    pub brands: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub related_products: Vec<ProductView>,
}

/// Display product listing page.
#[instrument(skip(state, layout))]
pub async fn index(
    State(state): State<AppState>,
    layout: Layout,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let api = state.api();
    let product_query = query.to_product_query(state.config().page_size);

    let (page, brands, categories) = tokio::join!(
        api.list_products(&product_query),
        api.list_brands(),
        api.list_categories(),
    );
    let page = page?;

    let (brands, categories) = (brands?, categories?);

    Ok(ProductsIndexTemplate {
        layout,
        products: ProductView::list(&page.items, state.config().currency),
        pagination: Pagination::new(&page, "/products", &filter_params(&product_query)),
        search: product_query.search.clone().unwrap_or_default(),
        brands: SelectOption::list(
            brands.iter().map(|b| (b.id.as_str(), b.name.as_str())),
            product_query.brand.as_ref().map(BrandId::as_str),
        ),
        categories: SelectOption::list(
            categories.iter().map(|c| (c.id.as_str(), c.name.as_str())),
            product_query.category.as_ref().map(CategoryId::as_str),
        ),
        sorts: sort_options(product_query.sort),
    })
}

/// Display product detail page.
///
/// Unpublished products are not shown to shoppers.
#[instrument(skip(state, layout), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let api = state.api();
    let currency = state.config().currency;
    let product = api.get_product(&ProductId::new(id)).await?;
    if !product.is_active {
        return Err(crate::error::AppError::NotFound(format!("product {}", product.id)));
    }

    // Related products are a nice-to-have; failures leave the list empty.
    let related_products = match &product.category {
        Some(category) => {
            let query = ProductQuery {
                category: Some(category.id.clone()),
                ..ProductQuery::first_page(RELATED_PRODUCTS + 1)
            };
            match api.list_products(&query).await {
                Ok(page) => page
                    .items
                    .iter()
                    .filter(|p| p.id != product.id)
                    .take(RELATED_PRODUCTS as usize)
                    .map(|p| ProductView::new(p, currency))
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load related products");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    Ok(ProductShowTemplate {
        layout,
        product: ProductView::new(&product, currency),
        related_products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_drops_blank_filters() {
        let query = ListingQuery {
            page: Some(0),
            search: Some("  ".to_string()),
            brand: Some("b1".to_string()),
            category: Some(String::new()),
            sort: Some("price_desc".to_string()),
        }
        .to_product_query(12);

        assert_eq!(query.page, 1);
        assert!(query.search.is_none());
        assert_eq!(query.brand, Some(BrandId::new("b1")));
        assert!(query.category.is_none());
        assert_eq!(query.sort, ProductSort::PriceDesc);
        assert!(query.is_cacheable());
    }

    #[test]
    fn test_sort_options_mark_current() {
        let options = sort_options(ProductSort::Name);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected.first().map(|o| o.value.as_str()), Some("name"));
    }
}
