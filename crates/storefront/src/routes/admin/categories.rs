//! Admin category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tracing::instrument;

use emporium_core::CategoryId;

use crate::api::ApiError;
use crate::error::Result;
use crate::filters;
use crate::forms::{CategoryForm, FieldErrors};
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{CategoryView, Layout, SelectOption};

use super::{AdminListQuery, list_with_notice};

#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryView>,
    pub notice: Option<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/categories/form.html")]
pub struct CategoryFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub form: CategoryForm,
    pub errors: FieldErrors,
    /// Possible parents; the edited category itself is left out.
    pub parents: Vec<SelectOption>,
}

impl CategoryFormTemplate {
    async fn load(
        state: &AppState,
        layout: Layout,
        id: Option<&CategoryId>,
        form: CategoryForm,
        errors: FieldErrors,
    ) -> Result<Self> {
        let categories = state.api().list_categories().await?;
        let parents = SelectOption::list(
            categories
                .iter()
                .filter(|c| Some(&c.id) != id)
                .map(|c| (c.id.as_str(), c.name.as_str())),
            form.parent_id.as_deref(),
        );

        Ok(Self {
            layout,
            heading: if id.is_some() { "Edit category" } else { "New category" },
            action: id.map_or_else(|| "/admin/categories".to_string(), edit_action),
            form,
            errors,
            parents,
        })
    }
}

fn edit_action(id: &CategoryId) -> String {
    format!("/admin/categories/{}", urlencoding::encode(id.as_str()))
}

#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let categories = state.api().list_categories().await?;

    Ok(CategoriesIndexTemplate {
        layout,
        categories: categories.iter().map(CategoryView::from).collect(),
        notice: query.notice(),
    })
}

#[instrument(skip_all)]
pub async fn new(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
) -> Result<impl IntoResponse> {
    CategoryFormTemplate::load(&state, layout, None, CategoryForm::default(), FieldErrors::new())
        .await
}

async fn save(
    state: &AppState,
    token: &SecretString,
    layout: Layout,
    id: Option<CategoryId>,
    form: CategoryForm,
) -> Result<Response> {
    let errors = match form.validate_for(id.as_ref()) {
        Ok(input) => {
            let result = match &id {
                Some(id) => state.api().update_category(token, id, &input).await,
                None => state.api().create_category(token, &input).await,
            };
            match result {
                Ok(_) => {
                    let notice = if id.is_some() { "updated" } else { "created" };
                    return Ok(Redirect::to(&list_with_notice("/admin/categories", notice))
                        .into_response());
                }
                Err(ApiError::Validation(errors)) => errors,
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    let page = CategoryFormTemplate::load(state, layout, id.as_ref(), form, errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, None, form).await
}

#[instrument(skip_all, fields(category_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = CategoryId::new(id);
    let category = state.api().get_category(&id).await?;

    CategoryFormTemplate::load(
        &state,
        layout,
        Some(&id),
        CategoryForm::from(&category),
        FieldErrors::new(),
    )
    .await
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, Some(CategoryId::new(id)), form).await
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, category_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    state
        .api()
        .delete_category(&auth.token, &CategoryId::new(id))
        .await?;
    Ok(Redirect::to(&list_with_notice("/admin/categories", "deleted")))
}
