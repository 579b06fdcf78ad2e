//! Integration tests for Emporium.
//!
//! Each test starts a [`MockBackend`] speaking the Emporium REST API on an
//! ephemeral port, then a real storefront router pointed at it
//! ([`TestApp::spawn`]). Tests drive the storefront over HTTP with a
//! cookie-keeping client and inspect the backend's recorded state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

pub mod mock_backend;

use std::net::SocketAddr;
use std::path::PathBuf;

use emporium_core::CurrencyCode;
use emporium_storefront::build_router;
use emporium_storefront::config::{ApiConfig, LogFormat, StorefrontConfig};
use emporium_storefront::state::AppState;
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;

pub use mock_backend::{ADMIN_EMAIL, CUSTOMER_EMAIL, MockBackend, PASSWORD};

/// A running storefront wired to a mock backend.
pub struct TestApp {
    pub url: String,
    pub client: Client,
    pub backend: MockBackend,
}

impl TestApp {
    /// Start a mock backend and a storefront in front of it.
    pub async fn spawn() -> Self {
        let backend = MockBackend::spawn().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            session_secret: SecretString::from("t3st-s3ss10n-k3y-Zq8w!Lp2#Vn7$Rx4".to_string()),
            page_size: 12,
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static")),
            currency: CurrencyCode::USD,
            api: ApiConfig::new(&backend.url).unwrap(),
            rate_limit: false,
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let app = build_router(AppState::new(config).unwrap());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            client: new_client(),
            backend,
        }
    }

    #[must_use]
    pub fn at(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// Sign in through the login form with the shared test password.
    pub async fn login(&self, email: &str) -> reqwest::Response {
        self.client
            .post(self.at("/auth/login"))
            .form(&[("email", email), ("password", PASSWORD)])
            .send()
            .await
            .unwrap()
    }

    /// Post a form as a plain browser would.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.at(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Post a form the way the page script does, asking for a fragment.
    pub async fn post_fragment(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.at(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.at(path)).send().await.unwrap()
    }

    pub async fn get_text(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }
}

/// Client that keeps cookies and does not follow redirects.
#[must_use]
pub fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
