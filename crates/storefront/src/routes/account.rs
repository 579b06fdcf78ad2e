//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;
use crate::views::Layout;

/// Profile display data.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub member_since: Option<String>,
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub layout: Layout,
    pub profile: ProfileView,
}

/// Display the signed-in user's profile, fresh from the backend.
///
/// A rejected token ends the session and sends the visitor to the login page.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    layout: Layout,
) -> Result<impl IntoResponse> {
    let user = state.api().me(&auth.token).await?;

    Ok(AccountIndexTemplate {
        layout,
        profile: ProfileView {
            name: user.name,
            email: user.email.into_inner(),
            role: user.role.to_string(),
            member_since: user.created_at.map(|d| d.format("%B %Y").to_string()),
        },
    })
}
