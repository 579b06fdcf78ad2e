//! Catalog pages and health checks against the mock backend.

#![allow(clippy::unwrap_used)]

use emporium_integration_tests::TestApp;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::spawn().await;

    let health = app.get("/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_page_shows_featured_products_and_taxonomy() {
    let app = TestApp::spawn().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Desk Lamp"));
    assert!(body.contains("Lumen"));
    assert!(body.contains("Lighting"));
}

#[tokio::test]
async fn test_product_listing_shows_active_products_only() {
    let app = TestApp::spawn().await;

    let response = app.get("/products").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Desk Lamp"));
    assert!(body.contains("Floor Lamp"));
    assert!(!body.contains("Retired Lamp"));
    assert!(body.contains("$24.50"));
}

#[tokio::test]
async fn test_product_search_filters_results() {
    let app = TestApp::spawn().await;

    let body = app.get_text("/products?search=floor").await;
    assert!(body.contains("Floor Lamp"));
    assert!(!body.contains("Desk Lamp"));
}

#[tokio::test]
async fn test_product_page_and_missing_product() {
    let app = TestApp::spawn().await;

    let response = app.get("/products/p1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Desk Lamp"));
    assert!(body.contains("Lumen"));

    assert_eq!(app.get("/products/nope").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_product_is_not_found() {
    let app = TestApp::spawn().await;

    assert_eq!(app.get("/products/p3").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_brand_and_category_pages() {
    let app = TestApp::spawn().await;

    let brands = app.get_text("/brands").await;
    assert!(brands.contains("Lumen"));

    let brand = app.get("/brands/b1").await;
    assert_eq!(brand.status(), StatusCode::OK);
    assert!(brand.text().await.unwrap().contains("Desk Lamp"));

    let category = app.get_text("/categories/c2").await;
    assert!(category.contains("Lighting"));
    assert!(category.contains("Home"));

    assert_eq!(app.get("/categories/missing").await.status(), StatusCode::NOT_FOUND);
}
