//! Login, registration, logout and expired backend tokens.

#![allow(clippy::unwrap_used)]

use emporium_integration_tests::{CUSTOMER_EMAIL, TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_failure_rerenders_form() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", CUSTOMER_EMAIL), ("password", "wrong password")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains(CUSTOMER_EMAIL));
}

#[tokio::test]
async fn test_login_returns_to_next() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/login",
            &[
                ("email", CUSTOMER_EMAIL),
                ("password", emporium_integration_tests::PASSWORD),
                ("next", "/account"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/account"));

    let account = app.get("/account").await;
    assert_eq!(account.status(), StatusCode::OK);
    assert!(account.text().await.unwrap().contains("Ada Customer"));
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/login",
            &[
                ("email", CUSTOMER_EMAIL),
                ("password", emporium_integration_tests::PASSWORD),
                ("next", "https://evil.example/"),
            ],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/"));
}

#[tokio::test]
async fn test_register_signs_in() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Lin Newcomer"),
                ("email", "lin@emporium.test"),
                ("password", "a long enough passw0rd"),
                ("password_confirm", "a long enough passw0rd"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.get_text("/account").await.contains("Lin Newcomer"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Ada Again"),
                ("email", CUSTOMER_EMAIL),
                ("password", "a long enough passw0rd"),
                ("password_confirm", "a long enough passw0rd"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Email is already registered")
    );
}

#[tokio::test]
async fn test_account_requires_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/account").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Faccount")
    );
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    app.login(CUSTOMER_EMAIL).await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/"));
    assert!(app.backend.data().tokens.is_empty());
    assert_eq!(app.get("/account").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_expired_token_signs_out() {
    let app = TestApp::spawn().await;
    app.login(CUSTOMER_EMAIL).await;
    app.backend.expire_tokens();

    let response = app.get("/account").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/auth/login"));

    // The session no longer holds a user.
    let response = app.get("/account").await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/auth/login?next=%2Faccount")
    );
}
