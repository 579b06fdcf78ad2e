//! Cart route handlers.
//!
//! Guests get a cart token in their session on the first add; signed-in users
//! operate on their own cart with their bearer token. Script requests
//! (`HX-Request: true`) get an HTML fragment and an `HX-Trigger: cart-updated`
//! header; plain form posts are redirected back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::Cart;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::forms::{CartItemForm, CartQuantityForm, CartRemoveForm, Validate};
use crate::routes::is_fragment_request;
use crate::services::cart_session;
use crate::state::AppState;
use crate::views::{CartView, Layout};

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart lines and totals fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Fragment of the updated lines for scripts, a redirect for forms.
fn lines_response(state: &AppState, headers: &HeaderMap, cart: &Cart) -> Response {
    if is_fragment_request(headers) {
        let cart = CartView::new(cart, state.config().currency);
        (AppendHeaders([CART_UPDATED]), CartItemsTemplate { cart }).into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(state, session, layout))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
) -> Result<impl IntoResponse> {
    let cart = cart_session::current_cart(state.api(), &session).await?;

    Ok(CartShowTemplate {
        layout,
        cart: CartView::new(&cart, state.config().currency),
    })
}

/// Add a product to the cart.
///
/// Returns the new count badge to scripts.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let (product_id, quantity) = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let owner = cart_session::resolve_owner(&session, true)
        .await?
        .ok_or_else(|| AppError::Internal("no cart owner after issuing a guest token".into()))?;

    let cart = state.api().add_to_cart(&owner, &product_id, quantity).await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    if is_fragment_request(&headers) {
        let count = cart.item_count();
        Ok((AppendHeaders([CART_UPDATED]), CartCountTemplate { count }).into_response())
    } else {
        Ok(Redirect::to("/cart").into_response())
    }
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartQuantityForm>,
) -> Result<Response> {
    let (product_id, quantity) = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let cart = match cart_session::resolve_owner(&session, false).await? {
        Some(owner) => {
            state
                .api()
                .set_cart_quantity(&owner, &product_id, quantity)
                .await?
        }
        None => Cart::default(),
    };

    Ok(lines_response(&state, &headers, &cart))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<CartRemoveForm>,
) -> Result<Response> {
    let product_id = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let cart = match cart_session::resolve_owner(&session, false).await? {
        Some(owner) => state.api().remove_from_cart(&owner, &product_id).await?,
        None => Cart::default(),
    };

    Ok(lines_response(&state, &headers, &cart))
}

/// Remove every line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let cart = match cart_session::resolve_owner(&session, false).await? {
        Some(owner) => state.api().clear_cart(&owner).await?,
        None => Cart::default(),
    };

    Ok(lines_response(&state, &headers, &cart))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let cart = cart_session::current_cart(state.api(), &session).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}
