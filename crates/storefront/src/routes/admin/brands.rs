//! Admin brand management.

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

use emporium_core::BrandId;

use crate::api::ApiError;
use crate::error::Result;
use crate::filters;
use crate::forms::{BrandForm, FieldErrors, Validate};
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{BrandView, Layout};

use super::{AdminListQuery, list_with_notice};

#[derive(Template, WebTemplate)]
#[template(path = "admin/brands/index.html")]
pub struct BrandsIndexTemplate {
    pub layout: Layout,
    pub brands: Vec<BrandView>,
    pub notice: Option<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/brands/form.html")]
pub struct BrandFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub form: BrandForm,
    pub errors: FieldErrors,
}

fn edit_action(id: &BrandId) -> String {
    format!("/admin/brands/{}", urlencoding::encode(id.as_str()))
}

#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let brands = state.api().list_brands().await?;

    Ok(BrandsIndexTemplate {
        layout,
        brands: brands.iter().map(BrandView::from).collect(),
        notice: query.notice(),
    })
}

#[instrument(skip_all)]
pub async fn new(RequireAdmin(_auth): RequireAdmin, layout: Layout) -> impl IntoResponse {
    BrandFormTemplate {
        layout,
        heading: "New brand",
        action: "/admin/brands".to_string(),
        form: BrandForm::default(),
        errors: FieldErrors::new(),
    }
}

async fn save(
    state: &AppState,
    token: &SecretString,
    layout: Layout,
    id: Option<BrandId>,
    form: BrandForm,
) -> Result<Response> {
    let errors = match form.validate() {
        Ok(input) => {
            let result = match &id {
                Some(id) => state.api().update_brand(token, id, &input).await,
                None => state.api().create_brand(token, &input).await,
            };
            match result {
                Ok(_) => {
                    let notice = if id.is_some() { "updated" } else { "created" };
                    return Ok(
                        Redirect::to(&list_with_notice("/admin/brands", notice)).into_response()
                    );
                }
                Err(ApiError::Validation(errors)) => errors,
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    let page = BrandFormTemplate {
        layout,
        heading: if id.is_some() { "Edit brand" } else { "New brand" },
        action: id.as_ref().map_or_else(|| "/admin/brands".to_string(), edit_action),
        form,
        errors,
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Form(form): Form<BrandForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, None, form).await
}

#[instrument(skip_all, fields(brand_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = BrandId::new(id);
    let brand = state.api().get_brand(&id).await?;

    Ok(BrandFormTemplate {
        layout,
        heading: "Edit brand",
        action: edit_action(&id),
        form: BrandForm::from(&brand),
        errors: FieldErrors::new(),
    })
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, brand_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
    Form(form): Form<BrandForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, Some(BrandId::new(id)), form).await
}

/// Delete a brand. The backend refuses brands that still have products.
#[instrument(skip_all, fields(admin_id = %auth.user.id, brand_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    state.api().delete_brand(&auth.token, &BrandId::new(id)).await?;
    Ok(Redirect::to(&list_with_notice("/admin/brands", "deleted")))
}
