//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (backend reachable)
//!
//! # Catalog
//! GET  /products               - Product listing (page, search, brand, category, sort)
//! GET  /products/{id}          - Product detail
//! GET  /brands                 - Brand listing
//! GET  /brands/{id}            - Brand page with its products
//! GET  /categories             - Category listing
//! GET  /categories/{id}        - Category page with its products
//!
//! # Cart (fragments for fetch/HTMX requests, redirects otherwise)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add item
//! POST /cart/update            - Set quantity (0 removes)
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (merges the guest cart)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action (merges the guest cart)
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//!
//! # Admin (requires admin role)
//! GET  /admin                  - Dashboard
//! /admin/products, /admin/brands, /admin/categories - CRUD
//! /admin/users                 - List, role change, delete
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Whether the request came from a script expecting a fragment.
pub(crate) fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::index))
        .route("/{id}", get(brands::show))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
///
/// With `rate_limit` set, `/auth` and `/cart` get per-IP governors.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let (auth, cart) = if rate_limit {
        (
            auth_routes().layer(auth_rate_limiter()),
            cart_routes().layer(cart_rate_limiter()),
        )
    } else {
        (auth_routes(), cart_routes())
    };

    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/products", product_routes())
        .nest("/brands", brand_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart)
        .nest("/auth", auth)
        .route("/account", get(account::index))
        .nest("/admin", admin::routes())
}

/// Liveness health check. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check: 503 when the backend does not answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.api().ping().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
