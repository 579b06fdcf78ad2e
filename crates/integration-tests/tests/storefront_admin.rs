//! Admin access control and product management.

#![allow(clippy::unwrap_used)]

use emporium_integration_tests::{ADMIN_EMAIL, CUSTOMER_EMAIL, TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_admin_requires_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Fadmin")
    );
}

#[tokio::test]
async fn test_admin_subpage_login_returns_to_full_path() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin/products?page=2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Fadmin%2Fproducts%3Fpage%3D2")
    );
}

#[tokio::test]
async fn test_admin_forbidden_for_customers() {
    let app = TestApp::spawn().await;
    app.login(CUSTOMER_EMAIL).await;

    assert_eq!(app.get("/admin").await.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.get("/admin/products").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard_counts() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let response = app.get("/admin").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Desk Lamp"));
}

#[tokio::test]
async fn test_admin_listing_includes_drafts() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let body = app.get_text("/admin/products").await;
    assert!(body.contains("Retired Lamp"));
    assert!(body.contains("Draft"));
}

#[tokio::test]
async fn test_admin_creates_product() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;
    assert!(!app.get_text("/products").await.contains("Reading Lamp"));

    let response = app
        .post_form(
            "/admin/products",
            &[
                ("name", "Reading Lamp"),
                ("price", "35.00"),
                ("stock", "7"),
                ("brand_id", "b1"),
                ("category_id", "c2"),
                ("is_active", "on"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/admin/products?notice=created")
    );

    let listing = app.get_text("/admin/products?notice=created").await;
    assert!(listing.contains("Reading Lamp"));

    // The public listing cache was invalidated by the write.
    assert!(app.get_text("/products").await.contains("Reading Lamp"));
}

#[tokio::test]
async fn test_admin_product_validation_rerenders_form() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let response = app
        .post_form("/admin/products", &[("name", "X"), ("price", "free"), ("stock", "1")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.backend.data().products.len(), 3);
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let response = app
        .post_form("/admin/users/u1/role", &[("role", "customer")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_cache_shows_backend_changes() {
    let app = TestApp::spawn().await;
    assert!(app.get_text("/products").await.contains("Desk Lamp"));

    // A change made behind the storefront's back stays hidden by the cache.
    app.backend
        .data()
        .products
        .retain(|p| p.id != "p1");
    assert!(app.get_text("/products").await.contains("Desk Lamp"));

    app.login(ADMIN_EMAIL).await;
    let response = app.post_form("/admin/cache/clear", &[]).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/admin?notice=cache-cleared")
    );
    assert!(!app.get_text("/products").await.contains("Desk Lamp"));
}
