//! Brand route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use emporium_core::BrandId;

use crate::error::Result;
use crate::filters;
use crate::routes::products::{ListingQuery, filter_params};
use crate::state::AppState;
use crate::views::{BrandView, Layout, Pagination, ProductView};

#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsIndexTemplate {
    pub layout: Layout,
    pub brands: Vec<BrandView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "brands/show.html")]
pub struct BrandShowTemplate {
    pub layout: Layout,
    pub brand: BrandView,
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
}

/// Display all brands.
#[instrument(skip(state, layout))]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let brands = state.api().list_brands().await?;

    Ok(BrandsIndexTemplate {
        layout,
        brands: brands.iter().map(BrandView::from).collect(),
    })
}

/// Display a brand with a page of its products.
#[instrument(skip(state, layout, query), fields(brand_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let api = state.api();
    let brand_id = BrandId::new(id);

    let mut product_query = query.to_product_query(state.config().page_size);
    product_query.brand = Some(brand_id.clone());
    product_query.category = None;

    let (brand, page) = tokio::join!(api.get_brand(&brand_id), api.list_products(&product_query));
    let brand = brand?;
    let page = page?;

    let base = format!("/brands/{}", urlencoding::encode(brand_id.as_str()));
    let mut params = filter_params(&product_query);
    params.retain(|(k, _)| *k != "brand");

    Ok(BrandShowTemplate {
        layout,
        brand: BrandView::from(&brand),
        products: ProductView::list(&page.items, state.config().currency),
        pagination: Pagination::new(&page, &base, &params),
    })
}
