//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use crate::api::{DashboardCounts, ProductQuery};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::admin::{AdminListQuery, list_with_notice};
use crate::state::AppState;
use crate::views::{Layout, ProductView};

const RECENT_PRODUCTS: u32 = 5;

#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub counts: DashboardCounts,
    pub recent_products: Vec<ProductView>,
    pub notice: Option<&'static str>,
}

/// Entity totals and the newest products.
#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let api = state.api();
    let recent_query = ProductQuery::first_page(RECENT_PRODUCTS);
    let (counts, recent) = tokio::join!(
        api.dashboard_counts(&auth.token),
        api.admin_products(&auth.token, &recent_query),
    );

    Ok(DashboardTemplate {
        layout,
        counts: counts?,
        recent_products: ProductView::list(&recent?.items, state.config().currency),
        notice: query.notice(),
    })
}

/// Drop every cached catalog response and cart.
#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn clear_cache(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Redirect {
    state.api().invalidate_all().await;
    tracing::info!("Backend response cache cleared");
    Redirect::to(&list_with_notice("/admin", "cache-cleared"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_renders_inside_admin_layout() {
        let page = DashboardTemplate {
            layout: Layout {
                user: None,
                cart_count: 0,
                nonce: String::new(),
            },
            counts: DashboardCounts {
                products: 7,
                brands: 2,
                categories: 3,
                users: 11,
            },
            recent_products: Vec::new(),
            notice: Some("Cache cleared"),
        };
        let html = page.render().unwrap();
        assert!(html.contains(r#"class="admin-nav""#));
        assert!(html.contains("<strong>11</strong> users"));
        assert!(html.contains("Cache cleared"));
        assert!(html.contains("</html>"));
    }
}
