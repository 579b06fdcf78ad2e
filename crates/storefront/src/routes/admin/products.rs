//! Admin product management.

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

use emporium_core::ProductId;

use crate::api::{ApiError, ProductQuery};
use crate::error::Result;
use crate::filters;
use crate::forms::{FieldErrors, ProductForm, Validate};
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{Layout, Pagination, ProductView, SelectOption};

use super::{AdminListQuery, list_with_notice};

#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub pagination: Pagination,
    pub search: String,
    pub notice: Option<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub brands: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
}

impl ProductFormTemplate {
    /// Form page with brand and category dropdowns loaded from the catalog.
    async fn load(
        state: &AppState,
        layout: Layout,
        heading: String,
        action: String,
        form: ProductForm,
        errors: FieldErrors,
    ) -> Result<Self> {
        let api = state.api();
        let (brands, categories) = tokio::join!(api.list_brands(), api.list_categories());
        let (brands, categories) = (brands?, categories?);

        Ok(Self {
            brands: SelectOption::list(
                brands.iter().map(|b| (b.id.as_str(), b.name.as_str())),
                form.brand_id.as_deref(),
            ),
            categories: SelectOption::list(
                categories.iter().map(|c| (c.id.as_str(), c.name.as_str())),
                form.category_id.as_deref(),
            ),
            layout,
            heading,
            action,
            form,
            errors,
        })
    }
}

fn edit_action(id: &ProductId) -> String {
    format!("/admin/products/{}", urlencoding::encode(id.as_str()))
}

/// Product list including unpublished products.
#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let product_query = ProductQuery {
        page: query.page(),
        search: query.search().map(String::from),
        ..ProductQuery::first_page(state.config().page_size)
    };
    let page = state.api().admin_products(&auth.token, &product_query).await?;
    let search = product_query.search.clone().unwrap_or_default();

    Ok(ProductsIndexTemplate {
        layout,
        products: ProductView::list(&page.items, state.config().currency),
        pagination: Pagination::new(&page, "/admin/products", &[("search", search.clone())]),
        search,
        notice: query.notice(),
    })
}

/// Blank product form.
#[instrument(skip_all)]
pub async fn new(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
) -> Result<impl IntoResponse> {
    let form = ProductForm {
        is_active: Some("on".to_string()),
        ..ProductForm::default()
    };
    ProductFormTemplate::load(
        &state,
        layout,
        "New product".to_string(),
        "/admin/products".to_string(),
        form,
        FieldErrors::new(),
    )
    .await
}

/// Validate, send and redirect, or re-render the form with errors.
async fn save(
    state: &AppState,
    token: &SecretString,
    layout: Layout,
    id: Option<ProductId>,
    form: ProductForm,
) -> Result<Response> {
    let (heading, action) = match &id {
        Some(id) => ("Edit product".to_string(), edit_action(id)),
        None => ("New product".to_string(), "/admin/products".to_string()),
    };

    let errors = match form.validate() {
        Ok(input) => {
            let result = match &id {
                Some(id) => state.api().update_product(token, id, &input).await,
                None => state.api().create_product(token, &input).await,
            };
            match result {
                Ok(_) => {
                    let notice = if id.is_some() { "updated" } else { "created" };
                    return Ok(Redirect::to(&list_with_notice("/admin/products", notice))
                        .into_response());
                }
                Err(ApiError::Validation(errors)) => errors,
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    let page = ProductFormTemplate::load(state, layout, heading, action, form, errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[instrument(skip_all, fields(admin_id = %auth.user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, None, form).await
}

/// Edit form prefilled from the current product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(_auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let product = state.api().get_product(&id).await?;

    ProductFormTemplate::load(
        &state,
        layout,
        "Edit product".to_string(),
        edit_action(&id),
        ProductForm::from(&product),
        FieldErrors::new(),
    )
    .await
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    layout: Layout,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    save(&state, &auth.token, layout, Some(ProductId::new(id)), form).await
}

#[instrument(skip_all, fields(admin_id = %auth.user.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    state
        .api()
        .delete_product(&auth.token, &ProductId::new(id))
        .await?;
    Ok(Redirect::to(&list_with_notice("/admin/products", "deleted")))
}
