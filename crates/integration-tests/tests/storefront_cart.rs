//! Guest cart flows and the guest-to-user merge on login.

#![allow(clippy::unwrap_used)]

use emporium_integration_tests::{CUSTOMER_EMAIL, PASSWORD, TestApp, location, new_client};
use reqwest::StatusCode;

#[tokio::test]
async fn test_form_add_redirects_to_cart() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "p1"), ("quantity", "2")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/cart"));

    let cart = app.get_text("/cart").await;
    assert!(cart.contains("Desk Lamp"));
    assert!(cart.contains("$49.00"));
}

#[tokio::test]
async fn test_fragment_add_returns_count_and_trigger() {
    let app = TestApp::spawn().await;

    let response = app
        .post_fragment("/cart/add", &[("product_id", "p2"), ("quantity", "2")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    let body = response.text().await.unwrap();
    assert!(body.contains(r#"id="cart-count""#));
    assert!(body.contains(">2<"));

    let count = app.get_text("/cart/count").await;
    assert!(count.contains(">2<"));
}

#[tokio::test]
async fn test_quantity_zero_removes_line() {
    let app = TestApp::spawn().await;
    app.post_form("/cart/add", &[("product_id", "p1")]).await;

    let response = app
        .post_fragment("/cart/update", &[("product_id", "p1"), ("quantity", "0")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_clear_empties_cart() {
    let app = TestApp::spawn().await;
    app.post_form("/cart/add", &[("product_id", "p1")]).await;
    app.post_form("/cart/add", &[("product_id", "p2")]).await;

    let response = app.post_form("/cart/clear", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.get_text("/cart").await.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_invalid_quantity_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "p1"), ("quantity", "-3")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guest_cart_merges_once_on_login() {
    let app = TestApp::spawn().await;
    app.backend.data().carts.insert(
        "user:u2".to_string(),
        vec![("p1".to_string(), 1), ("p2".to_string(), 1)],
    );

    app.post_form("/cart/add", &[("product_id", "p1"), ("quantity", "2")])
        .await;

    let response = app.login(CUSTOMER_EMAIL).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    {
        let data = app.backend.data();
        assert_eq!(data.replace_cart_calls, 1);
        assert_eq!(
            data.cart("user:u2"),
            vec![("p1".to_string(), 3), ("p2".to_string(), 1)]
        );
        assert!(
            data.carts
                .iter()
                .filter(|(key, _)| key.starts_with("guest:"))
                .all(|(_, lines)| lines.is_empty())
        );
    }

    let cart = app.get_text("/cart").await;
    assert!(cart.contains("Desk Lamp"));
    assert!(cart.contains("Floor Lamp"));

    // A fresh login without a new guest cart has nothing to merge.
    app.post_form("/auth/logout", &[]).await;
    app.login(CUSTOMER_EMAIL).await;
    assert_eq!(app.backend.data().replace_cart_calls, 1);
}

#[tokio::test]
async fn test_login_without_guest_cart_sends_no_merge() {
    let app = TestApp::spawn().await;

    app.login(CUSTOMER_EMAIL).await;
    assert_eq!(app.backend.data().replace_cart_calls, 0);
}

#[tokio::test]
async fn test_merge_reads_user_cart_past_stale_cache() {
    let app = TestApp::spawn().await;

    // One browser signs in and views the empty cart, leaving it cached.
    app.login(CUSTOMER_EMAIL).await;
    assert!(app.get_text("/cart").await.contains("Your cart is empty"));

    // The cart changes on the backend behind the storefront's back.
    app.backend
        .data()
        .carts
        .insert("user:u2".to_string(), vec![("p2".to_string(), 2)]);

    // A second browser shops as a guest, then signs in as the same user.
    let other = new_client();
    other
        .post(app.at("/cart/add"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    let response = other
        .post(app.at("/auth/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let data = app.backend.data();
    assert_eq!(data.replace_cart_calls, 1);
    assert_eq!(
        data.cart("user:u2"),
        vec![("p2".to_string(), 2), ("p1".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_merge_caps_combined_quantity_at_stock() {
    let app = TestApp::spawn().await;
    // Floor Lamp has 3 in stock.
    app.backend
        .data()
        .carts
        .insert("user:u2".to_string(), vec![("p2".to_string(), 2)]);

    app.post_form("/cart/add", &[("product_id", "p2"), ("quantity", "2")])
        .await;
    app.login(CUSTOMER_EMAIL).await;

    let data = app.backend.data();
    assert_eq!(data.replace_cart_calls, 1);
    assert_eq!(data.cart("user:u2"), vec![("p2".to_string(), 3)]);
}
