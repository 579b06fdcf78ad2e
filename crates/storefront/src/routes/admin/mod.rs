//! Admin dashboard route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin):
//! visitors are sent to the login page, signed-in customers get a 403.
//!
//! ```text
//! GET  /admin                          - Dashboard counts
//! POST /admin/cache/clear              - Drop every cached backend response
//! GET  /admin/products                 - Product list (all statuses)
//! GET  /admin/products/new             - New product form
//! POST /admin/products                 - Create product
//! GET  /admin/products/{id}/edit       - Edit product form
//! POST /admin/products/{id}            - Update product
//! POST /admin/products/{id}/delete     - Delete product
//! (same shape for /admin/brands and /admin/categories)
//! GET  /admin/users                    - User list
//! GET  /admin/users/{id}               - User detail
//! POST /admin/users/{id}/role          - Change role
//! POST /admin/users/{id}/delete        - Delete user
//! ```

pub mod brands;
pub mod categories;
pub mod dashboard;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters shared by admin list pages.
#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub notice: Option<String>,
}

impl AdminListQuery {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Banner text for a notice code set by a redirect.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        match self.notice.as_deref()? {
            "created" => Some("Saved. The new record is live."),
            "updated" => Some("Changes saved."),
            "deleted" => Some("Deleted."),
            "cache-cleared" => Some("Cache cleared. Pages now show live backend data."),
            _ => None,
        }
    }
}

/// Redirect target for a list page with a notice.
pub(crate) fn list_with_notice(base: &str, notice: &str) -> String {
    format!("{base}?notice={notice}")
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/cache/clear", post(dashboard::clear_cache))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/brands", get(brands::index).post(brands::create))
        .route("/brands/new", get(brands::new))
        .route("/brands/{id}", post(brands::update))
        .route("/brands/{id}/edit", get(brands::edit))
        .route("/brands/{id}/delete", post(brands::delete))
        .route("/categories", get(categories::index).post(categories::create))
        .route("/categories/new", get(categories::new))
        .route("/categories/{id}", post(categories::update))
        .route("/categories/{id}/edit", get(categories::edit))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/users", get(users::index))
        .route("/users/{id}", get(users::show))
        .route("/users/{id}/role", post(users::update_role))
        .route("/users/{id}/delete", post(users::delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = AdminListQuery {
            page: Some(0),
            search: Some("   ".to_string()),
            notice: Some("<script>".to_string()),
        };
        assert_eq!(query.page(), 1);
        assert!(query.search().is_none());
        assert!(query.notice().is_none());
    }

    #[test]
    fn test_known_notice() {
        let query = AdminListQuery {
            notice: Some("deleted".to_string()),
            ..AdminListQuery::default()
        };
        assert_eq!(query.notice(), Some("Deleted."));
    }
}
