//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use emporium_core::{Category, CategoryId};

use crate::error::Result;
use crate::filters;
use crate::routes::products::{ListingQuery, filter_params};
use crate::state::AppState;
use crate::views::{CategoryView, Layout, Pagination, ProductView};

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub layout: Layout,
    pub category: CategoryView,
    pub parent: Option<CategoryView>,
    pub subcategories: Vec<CategoryView>,
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
}

/// Top-level categories first, each followed by its children.
fn tree_order(categories: &[Category]) -> Vec<CategoryView> {
    let mut ordered = Vec::with_capacity(categories.len());
    let is_root = |c: &Category| {
        c.parent_id
            .as_ref()
            .is_none_or(|p| !categories.iter().any(|other| &other.id == p))
    };
    for root in categories.iter().filter(|c| is_root(c)) {
        ordered.push(CategoryView::from(root));
        ordered.extend(
            categories
                .iter()
                .filter(|c| c.parent_id.as_ref() == Some(&root.id))
                .map(CategoryView::from),
        );
    }
    ordered
}

/// Display all categories.
#[instrument(skip(state, layout))]
pub async fn index(State(state): State<AppState>, layout: Layout) -> Result<impl IntoResponse> {
    let categories = state.api().list_categories().await?;

    Ok(CategoriesIndexTemplate {
        layout,
        categories: tree_order(&categories),
    })
}

/// Display a category with its subcategories and a page of its products.
#[instrument(skip(state, layout, query), fields(category_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let api = state.api();
    let category_id = CategoryId::new(id);

    let mut product_query = query.to_product_query(state.config().page_size);
    product_query.category = Some(category_id.clone());
    product_query.brand = None;

    let (category, all, page) = tokio::join!(
        api.get_category(&category_id),
        api.list_categories(),
        api.list_products(&product_query),
    );
    let category = category?;
    let all = all?;
    let page = page?;

    let parent = category
        .parent_id
        .as_ref()
        .and_then(|p| all.iter().find(|c| &c.id == p))
        .map(CategoryView::from);
    let subcategories = all
        .iter()
        .filter(|c| c.parent_id.as_ref() == Some(&category.id))
        .map(CategoryView::from)
        .collect();

    let base = format!("/categories/{}", urlencoding::encode(category_id.as_str()));
    let mut params = filter_params(&product_query);
    params.retain(|(k, _)| *k != "category");

    Ok(CategoryShowTemplate {
        layout,
        category: CategoryView::from(&category),
        parent,
        subcategories,
        products: ProductView::list(&page.items, state.config().currency),
        pagination: Pagination::new(&page, &base, &params),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.to_uppercase(),
            slug: id.to_string(),
            description: None,
            parent_id: parent.map(CategoryId::new),
            product_count: None,
        }
    }

    #[test]
    fn test_tree_order_groups_children_under_parents() {
        let categories = vec![
            category("lamps", Some("home")),
            category("garden", None),
            category("home", None),
            category("orphan", Some("missing")),
        ];
        let ids: Vec<_> = tree_order(&categories).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["garden", "home", "lamps", "orphan"]);
    }
}
