//! Authentication extractors.
//!
//! `RequireAuth` and `RequireAdmin` hand the handler the session user together
//! with the backend bearer token; `OptionalAuth` only reads the user.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// A signed-in user and the token that authenticates them to the backend.
#[derive(Clone)]
pub struct AuthContext {
    pub user: CurrentUser,
    pub token: SecretString,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub AuthContext);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub AuthContext);

/// Rejection from the authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, coming back to `next` afterwards.
    RedirectToLogin { next: String },
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in without the admin role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                let target = format!("/auth/login?next={}", urlencoding::encode(&next));
                Redirect::to(&target).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "You do not have access to this page").into_response()
            }
        }
    }
}

/// Rejection for a request without a signed-in user.
///
/// Inside a nested router `parts.uri` has the mount prefix stripped, so the
/// full request URI is taken from [`OriginalUri`] when it is present.
fn unauthenticated(parts: &Parts) -> AuthRejection {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    let path = uri.path();
    if path.starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        let next = uri
            .path_and_query()
            .map_or(path, |pq| pq.as_str())
            .to_string();
        AuthRejection::RedirectToLogin { next }
    }
}

async fn load_auth(parts: &Parts) -> Option<AuthContext> {
    // Set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    let token: String = session
        .get(session_keys::API_TOKEN)
        .await
        .ok()
        .flatten()?;

    Some(AuthContext {
        user,
        token: SecretString::from(token),
    })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        load_auth(parts)
            .await
            .map(Self)
            .ok_or_else(|| unauthenticated(parts))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = load_auth(parts)
            .await
            .ok_or_else(|| unauthenticated(parts))?;

        if !auth.user.is_admin() {
            tracing::warn!(user_id = %auth.user.id, path = %parts.uri.path(), "Admin access denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(auth))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store a signed-in user and their backend token in the session.
///
/// The session id is rotated first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session.insert(session_keys::API_TOKEN, token).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use emporium_core::{Email, Role, UserId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            role,
        }
    }

    async fn parts_for(uri: &str, signed_in: Option<Role>) -> Parts {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(role) = signed_in {
            set_current_user(&session, &user(role), "tok").await.unwrap();
        }
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_require_auth_redirects_with_next() {
        let mut parts = parts_for("/account?tab=orders", None).await;
        let Err(AuthRejection::RedirectToLogin { next }) =
            RequireAuth::from_request_parts(&mut parts, &()).await
        else {
            panic!("expected redirect");
        };
        assert_eq!(next, "/account?tab=orders");

        let response = AuthRejection::RedirectToLogin { next }.into_response();
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/auth/login?next=%2Faccount%3Ftab%3Dorders"
        );
    }

    #[tokio::test]
    async fn test_redirect_keeps_nested_mount_prefix() {
        // What a router nested at /admin hands the extractor.
        let mut parts = parts_for("/products?page=2", None).await;
        parts.extensions.insert(OriginalUri(
            "/admin/products?page=2".parse().unwrap(),
        ));
        let Err(AuthRejection::RedirectToLogin { next }) =
            RequireAdmin::from_request_parts(&mut parts, &()).await
        else {
            panic!("expected redirect");
        };
        assert_eq!(next, "/admin/products?page=2");
    }

    #[tokio::test]
    async fn test_require_auth_api_path_is_unauthorized() {
        let mut parts = parts_for("/api/cart", None).await;
        assert!(matches!(
            RequireAuth::from_request_parts(&mut parts, &()).await,
            Err(AuthRejection::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_customer() {
        let mut parts = parts_for("/admin", Some(Role::Customer)).await;
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut parts, &()).await,
            Err(AuthRejection::Forbidden)
        ));

        let mut parts = parts_for("/admin", Some(Role::Admin)).await;
        let RequireAdmin(auth) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(auth.user.is_admin());
    }

    #[tokio::test]
    async fn test_optional_auth_never_rejects() {
        let mut parts = parts_for("/", None).await;
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
