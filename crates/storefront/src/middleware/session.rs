//! Session middleware configuration.
//!
//! Sessions live in memory: they hold only the signed-in user snapshot, the
//! backend token and the guest cart id, all of which the backend can recreate.

use axum::{extract::Request, middleware::Next, response::Response};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer, cookie::Key, service::SignedCookie,
};

use crate::config::StorefrontConfig;
use crate::error::SessionExpired;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "emporium_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookie signing key. SHA-512 stretches the configured secret to the 64
/// bytes the signer needs.
fn signing_key(secret: &SecretString) -> Key {
    Key::from(Sha512::digest(secret.expose_secret().as_bytes()).as_slice())
}

/// Create the session layer backed by an in-memory store.
///
/// The session id cookie is signed with `STOREFRONT_SESSION_SECRET`.
#[must_use]
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_signed(signing_key(&config.session_secret))
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Sign the visitor out when the backend rejected their token.
///
/// Handlers signal this by returning `AppError::Api(ApiError::Unauthorized)`,
/// which marks the response with [`SessionExpired`].
pub async fn expire_session_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("Backend token rejected, signing out");
        for key in [
            session_keys::CURRENT_USER,
            session_keys::API_TOKEN,
            session_keys::CART_MERGED_FOR,
        ] {
            if let Err(e) = session.remove_value(key).await {
                tracing::warn!(error = %e, key, "Failed to clear expired session value");
            }
        }
        crate::error::clear_sentry_user();
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, middleware::from_fn, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_signing_key_is_stable_per_secret() {
        let a = signing_key(&SecretString::from("k".repeat(40)));
        let b = signing_key(&SecretString::from("k".repeat(40)));
        let c = signing_key(&SecretString::from("j".repeat(40)));
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[tokio::test]
    async fn test_expired_token_clears_user() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert(session_keys::API_TOKEN, "stale").await.unwrap();
        session
            .insert(session_keys::GUEST_CART_ID, "guest")
            .await
            .unwrap();

        let handler_session = session.clone();
        let app = Router::new()
            .route(
                "/account",
                get(|| async { AppError::Api(crate::api::ApiError::Unauthorized) }),
            )
            .layer(from_fn(move |mut request: Request<Body>, next: Next| {
                let session = handler_session.clone();
                request.extensions_mut().insert(session.clone());
                async move { expire_session_middleware(session, request, next).await }
            }));

        let response = app
            .oneshot(Request::get("/account").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert!(
            session
                .get::<String>(session_keys::API_TOKEN)
                .await
                .unwrap()
                .is_none()
        );
        // The guest cart survives a forced sign-out.
        assert!(
            session
                .get::<String>(session_keys::GUEST_CART_ID)
                .await
                .unwrap()
                .is_some()
        );
    }
}
