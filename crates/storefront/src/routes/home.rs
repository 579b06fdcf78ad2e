//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::api::ProductQuery;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::views::{BrandView, CategoryView, Layout, ProductView};

/// Products shown on the home page.
const FEATURED_PRODUCTS: u32 = 8;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub brands: Vec<BrandView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page: newest products, brands and categories.
#[instrument(skip(state, layout))]
pub async fn home(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let api = state.api();
    let currency = state.config().currency;

    let featured = ProductQuery::first_page(FEATURED_PRODUCTS);
    let (products, brands, categories) = tokio::join!(
        api.list_products(&featured),
        api.list_brands(),
        api.list_categories(),
    );

    Ok(HomeTemplate {
        layout,
        products: ProductView::list(&products?.items, currency),
        brands: brands?.iter().map(BrandView::from).collect(),
        categories: categories?.iter().map(CategoryView::from).collect(),
    })
}
