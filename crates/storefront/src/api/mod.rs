//! Client for the Emporium backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for every entity. No local storage.
//! - Catalog reads (products, brands, categories) are cached in memory via
//!   `moka` with a short TTL; every catalog write invalidates what it touched.
//! - Carts are cached per owner with an even shorter TTL and replaced by the
//!   response of each cart mutation.
//!
//! # Authentication
//!
//! Calls carry one of three [`Credentials`]: nothing, a bearer token for a
//! signed-in user, or the guest cart's session id in `X-Session-Id`.
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::api::{ApiClient, CartOwner};
//!
//! let client = ApiClient::new(&config.api)?;
//! let product = client.get_product(&product_id).await?;
//! let cart = client
//!     .add_to_cart(&CartOwner::Guest(token), &product.id, 1)
//!     .await?;
//! ```

mod auth;
mod cache;
mod cart;
mod catalog;
mod error;
mod users;

pub use cache::{CacheKey, CacheValue, CartKey, ProductQuery};
pub use cart::CartOwner;
pub use catalog::DashboardCounts;
pub use error::ApiError;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use emporium_core::{Cart, SessionToken};

use crate::config::ApiConfig;
use error::error_from_response;

/// Header carrying the guest cart's session id.
pub const SESSION_ID_HEADER: &str = "X-Session-Id";

/// Maximum number of cached catalog responses.
const CATALOG_CACHE_CAPACITY: u64 = 1_000;

/// Maximum number of cached carts.
const CART_CACHE_CAPACITY: u64 = 10_000;

/// How a request identifies its caller to the backend.
#[derive(Clone, Copy)]
pub enum Credentials<'a> {
    /// Public catalog reads.
    Anonymous,
    /// Signed-in user.
    Bearer(&'a SecretString),
    /// Guest cart.
    Session(&'a SessionToken),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and caches.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    catalog: Cache<CacheKey, CacheValue>,
    carts: Cache<CartKey, Cart>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("emporium-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .support_invalidation_closures()
            .build();

        let carts = Cache::builder()
            .max_capacity(CART_CACHE_CAPACITY)
            .time_to_live(config.cart_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                catalog,
                carts,
            }),
        })
    }

    /// Resolve a path relative to the configured base URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request with the given credentials attached.
    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: Credentials<'_>,
    ) -> Result<RequestBuilder, ApiError> {
        let builder = self
            .inner
            .http
            .request(method, self.url(path)?)
            .header("Accept", "application/json");

        Ok(match credentials {
            Credentials::Anonymous => builder,
            Credentials::Bearer(token) => builder.bearer_auth(token.expose_secret()),
            Credentials::Session(session) => builder.header(SESSION_ID_HEADER, session.as_str()),
        })
    }

    /// Send a request and return the body of a successful response.
    ///
    /// `what` names the resource for `NotFound` errors and logs.
    async fn send_raw(&self, builder: RequestBuilder, what: &str) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    resource = what,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                debug!(status = %status, resource = what, "Backend rejected request");
            }
            return Err(error_from_response(status, retry_after, &body, what));
        }

        Ok(body)
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(builder, what).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                resource = what,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is ignored.
    async fn send_empty(&self, builder: RequestBuilder, what: &str) -> Result<(), ApiError> {
        self.send_raw(builder, what).await.map(|_| ())
    }

    /// Check that the backend answers a cheap public request.
    pub async fn ping(&self) -> bool {
        match self.request(Method::GET, "brands", Credentials::Anonymous) {
            Ok(builder) => self.send_empty(builder, "brands").await.is_ok(),
            Err(_) => false,
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let value = self.inner.catalog.get(key).await;
        if value.is_some() {
            debug!(key = ?key, "Cache hit");
        }
        value
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.catalog.insert(key, value).await;
    }

    /// Drop every cached product listing page.
    fn invalidate_product_listings(&self) {
        if let Err(e) = self
            .inner
            .catalog
            .invalidate_entries_if(|key, _| matches!(key, CacheKey::Products(_)))
        {
            tracing::warn!(error = %e, "Failed to invalidate product listings");
        }
    }

    /// Invalidate all cached data, catalog and carts.
    pub async fn invalidate_all(&self) {
        self.inner.catalog.invalidate_all();
        self.inner.carts.invalidate_all();
        self.inner.catalog.run_pending_tasks().await;
        self.inner.carts.run_pending_tasks().await;
    }
}

/// Percent-encode an ID for use as a path segment.
fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
