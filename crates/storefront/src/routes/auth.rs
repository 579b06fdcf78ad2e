//! Authentication route handlers.
//!
//! Login and registration call the backend, store the returned user and
//! bearer token in the session, then fold any guest cart into the user's cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::AuthResponse;

use crate::api::{ApiError, CartKey};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{FieldErrors, LoginForm, RegisterForm, Validate, auth::safe_next_path};
use crate::middleware::{CspNonce, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::cart_session;
use crate::state::AppState;
use crate::views::Layout;

/// Query parameters for the login and register pages.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub next: String,
    pub errors: FieldErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub next: String,
    pub errors: FieldErrors,
}

fn next_value(next: Option<&str>) -> String {
    safe_next_path(next).unwrap_or_default().to_string()
}

/// Sign the user in and merge their guest cart.
async fn start_session(state: &AppState, session: &Session, auth: AuthResponse) -> Result<()> {
    let user = CurrentUser::from(auth.user);
    set_current_user(session, &user, &auth.token).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    let token = SecretString::from(auth.token);
    let outcome = cart_session::reconcile_on_login(state.api(), session, &user, &token).await;
    tracing::info!(user_id = %user.id, ?outcome, "User signed in");
    Ok(())
}

fn redirect_after_login(next: Option<&str>) -> Response {
    Redirect::to(safe_next_path(next).unwrap_or("/")).into_response()
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip(layout))]
pub async fn login_page(layout: Layout, Query(query): Query<NextQuery>) -> impl IntoResponse {
    LoginTemplate {
        layout,
        email: String::new(),
        next: next_value(query.next.as_deref()),
        errors: FieldErrors::new(),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let errors = match form.validate() {
        Ok(request) => match state.api().login(&request).await {
            Ok(auth) => {
                start_session(&state, &session, auth).await?;
                return Ok(redirect_after_login(form.next.as_deref()));
            }
            Err(ApiError::Unauthorized | ApiError::NotFound(_)) => {
                tracing::info!("Login rejected");
                let mut errors = FieldErrors::new();
                errors.add_form("Invalid email or password");
                errors
            }
            Err(ApiError::Validation(errors)) => errors,
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let layout = Layout::load(&state, Some(&session), nonce.value().to_string()).await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        LoginTemplate {
            layout,
            email: form.email.trim().to_string(),
            next: next_value(form.next.as_deref()),
            errors,
        },
    )
        .into_response())
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip(layout))]
pub async fn register_page(layout: Layout, Query(query): Query<NextQuery>) -> impl IntoResponse {
    RegisterTemplate {
        layout,
        name: String::new(),
        email: String::new(),
        next: next_value(query.next.as_deref()),
        errors: FieldErrors::new(),
    }
}

/// Handle registration form submission. A new account is signed in at once.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let errors = match form.validate() {
        Ok(request) => match state.api().register(&request).await {
            Ok(auth) => {
                start_session(&state, &session, auth).await?;
                return Ok(redirect_after_login(form.next.as_deref()));
            }
            Err(ApiError::Validation(errors)) => errors,
            Err(ApiError::Status { status, message }) if status == StatusCode::CONFLICT => {
                let mut errors = FieldErrors::new();
                errors.add("email", message);
                errors
            }
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let layout = Layout::load(&state, Some(&session), nonce.value().to_string()).await;
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        RegisterTemplate {
            layout,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            next: next_value(form.next.as_deref()),
            errors,
        },
    )
        .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out: revoke the backend token, forget the cached cart and destroy
/// the session.
///
/// The guest cart token goes with the session, so the visitor starts over
/// with an empty cart.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Ok(Some(token)) = session.get::<String>(session_keys::API_TOKEN).await {
        // The session is destroyed either way; a failed revoke only leaves
        // the token to expire on the backend.
        if let Err(e) = state.api().logout(&SecretString::from(token)).await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
    }
    if let Ok(Some(user)) = session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        state.api().invalidate_carts(&[CartKey::User(user.id)]).await;
    }

    cart_session::clear_on_logout(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_value_drops_offsite_targets() {
        assert_eq!(next_value(Some("/cart")), "/cart");
        assert_eq!(next_value(Some("https://evil.example")), "");
        assert_eq!(next_value(None), "");
    }

    #[test]
    fn test_redirect_after_login_defaults_home() {
        let response = redirect_after_login(Some("//evil.example"));
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/")
        );
    }
}
