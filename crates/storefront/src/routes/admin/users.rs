//! Admin user management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use emporium_core::{Role, User, UserId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{RoleForm, Validate};
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{Layout, Pagination, SelectOption};

use super::{AdminListQuery, list_with_notice};

#[derive(Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub joined: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            is_admin: user.role.is_admin(),
            joined: user
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/users/index.html")]
pub struct UsersIndexTemplate {
    pub layout: Layout,
    pub users: Vec<UserView>,
    pub pagination: Pagination,
    pub search: String,
    pub notice: Option<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/users/show.html")]
pub struct UserShowTemplate {
    pub layout: Layout,
    pub user: UserView,
    pub roles: Vec<SelectOption>,
    /// Admins cannot demote or delete themselves.
    pub is_self: bool,
    pub notice: Option<&'static str>,
}

fn role_options(current: Role) -> Vec<SelectOption> {
    Role::ALL
        .into_iter()
        .map(|r| SelectOption::new(r.as_str(), r.as_str(), r == current))
        .collect()
}

fn user_path(id: &UserId) -> String {
    format!("/admin/users/{}", urlencoding::encode(id.as_str()))
}

#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let page = state
        .api()
        .list_users(
            &auth.token,
            query.page(),
            state.config().page_size,
            query.search(),
        )
        .await?;
    let search = query.search().unwrap_or_default().to_string();

    Ok(UsersIndexTemplate {
        layout,
        users: page.items.iter().map(UserView::from).collect(),
        pagination: Pagination::new(&page, "/admin/users", &[("search", search.clone())]),
        search,
        notice: query.notice(),
    })
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let id = UserId::new(id);
    let user = state.api().get_user(&auth.token, &id).await?;

    Ok(UserShowTemplate {
        layout,
        roles: role_options(user.role),
        is_self: user.id == auth.user.id,
        user: UserView::from(&user),
        notice: query.notice(),
    })
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, user_id = %id))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect> {
    let id = UserId::new(id);
    let role = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if id == auth.user.id {
        return Err(AppError::BadRequest("You cannot change your own role".into()));
    }

    state.api().update_user_role(&auth.token, &id, role).await?;
    Ok(Redirect::to(&list_with_notice(&user_path(&id), "updated")))
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, user_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = UserId::new(id);
    if id == auth.user.id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }

    state.api().delete_user(&auth.token, &id).await?;
    Ok(Redirect::to(&list_with_notice("/admin/users", "deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_options_select_current() {
        let options = role_options(Role::Admin);
        assert_eq!(options.len(), 2);
        assert!(options.iter().any(|o| o.value == "admin" && o.selected));
        assert!(options.iter().any(|o| o.value == "customer" && !o.selected));
    }

    #[test]
    fn test_user_path_encodes_id() {
        assert_eq!(user_path(&UserId::new("a/b")), "/admin/users/a%2Fb");
    }
}
