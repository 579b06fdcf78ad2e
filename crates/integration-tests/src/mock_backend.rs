//! In-process stand-in for the Emporium REST API.
//!
//! Holds users, catalog and carts in memory behind a mutex and answers the
//! endpoints the storefront calls. Tests seed it through the public fields of
//! [`BackendData`] and read back what the storefront did (for example how many
//! cart replacements it sent).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const ADMIN_EMAIL: &str = "admin@emporium.test";
pub const CUSTOMER_EMAIL: &str = "ada@emporium.test";
pub const PASSWORD: &str = "correct horse battery";

#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: &'static str,
}

impl MockUser {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "createdAt": "2024-03-01T12:00:00Z",
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockProduct {
    pub id: String,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub brand_id: Option<String>,
    pub category_id: Option<String>,
    pub is_active: bool,
}

/// Everything the mock backend knows.
#[derive(Debug, Default)]
pub struct BackendData {
    pub users: Vec<MockUser>,
    pub products: Vec<MockProduct>,
    /// `(id, name)`
    pub brands: Vec<(String, String)>,
    /// `(id, name, parent id)`
    pub categories: Vec<(String, String, Option<String>)>,
    /// Bearer token to user id.
    pub tokens: HashMap<String, String>,
    /// Cart lines keyed by `user:<id>` or `guest:<session id>`.
    pub carts: HashMap<String, Vec<(String, u32)>>,
    /// Number of `PUT /cart` requests received.
    pub replace_cart_calls: usize,
    next_id: u32,
}

impl BackendData {
    fn seeded() -> Self {
        let user = |id: &str, name: &str, email: &str, role| MockUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
        };
        let product = |id: &str, name: &str, price: &str, stock, active| MockProduct {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            stock,
            brand_id: Some("b1".to_string()),
            category_id: Some("c2".to_string()),
            is_active: active,
        };

        Self {
            users: vec![
                user("u1", "Grace Admin", ADMIN_EMAIL, "admin"),
                user("u2", "Ada Customer", CUSTOMER_EMAIL, "customer"),
            ],
            products: vec![
                product("p1", "Desk Lamp", "24.50", 10, true),
                product("p2", "Floor Lamp", "89.00", 3, true),
                product("p3", "Retired Lamp", "15.00", 5, false),
            ],
            brands: vec![("b1".to_string(), "Lumen".to_string())],
            categories: vec![
                ("c1".to_string(), "Home".to_string(), None),
                ("c2".to_string(), "Lighting".to_string(), Some("c1".to_string())),
            ],
            next_id: 100,
            ..Self::default()
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn user_for_token(&self, headers: &HeaderMap) -> Option<&MockUser> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| &u.id == id)
    }

    fn product_json(&self, p: &MockProduct) -> Value {
        let brand = p
            .brand_id
            .as_ref()
            .and_then(|id| self.brands.iter().find(|(b, _)| b == id))
            .map(|(id, name)| json!({ "id": id, "name": name }));
        let category = p
            .category_id
            .as_ref()
            .and_then(|id| self.categories.iter().find(|(c, _, _)| c == id))
            .map(|(id, name, _)| json!({ "id": id, "name": name }));
        json!({
            "id": p.id,
            "name": p.name,
            "slug": p.name.to_lowercase().replace(' ', "-"),
            "description": format!("A fine {}", p.name.to_lowercase()),
            "price": p.price,
            "stock": p.stock,
            "images": [],
            "brand": brand,
            "category": category,
            "isActive": p.is_active,
        })
    }

    fn cart_json(&self, key: &str) -> Value {
        let items: Vec<Value> = self
            .carts
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|(id, quantity)| {
                let p = self.products.iter().find(|p| &p.id == id)?;
                Some(json!({
                    "productId": p.id,
                    "name": p.name,
                    "price": p.price,
                    "quantity": quantity,
                    "stock": p.stock,
                }))
            })
            .collect();
        json!({ "id": key, "items": items })
    }

    /// Cart lines for a user or guest key.
    #[must_use]
    pub fn cart(&self, key: &str) -> Vec<(String, u32)> {
        self.carts.get(key).cloned().unwrap_or_default()
    }
}

type Shared = Arc<Mutex<BackendData>>;

/// A mock backend listening on an ephemeral port.
#[derive(Clone)]
pub struct MockBackend {
    pub url: String,
    data: Shared,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let data: Shared = Arc::new(Mutex::new(BackendData::seeded()));
        let app = router(data.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/"),
            data,
        }
    }

    /// Lock the backend state for inspection or seeding.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap()
    }

    /// Invalidate every issued token, as if they had expired.
    pub fn expire_tokens(&self) {
        self.data().tokens.clear();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(data: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/brands", get(list_brands))
        .route("/brands/{id}", get(get_brand))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .route(
            "/cart",
            get(get_cart).put(replace_cart).delete(clear_cart),
        )
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/{id}",
            patch(set_quantity).delete(remove_item),
        )
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .with_state(data)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Authentication required")
}

/// Admin-only guard; returns the error response to send otherwise.
fn require_admin(data: &BackendData, headers: &HeaderMap) -> Result<(), Response> {
    match data.user_for_token(headers) {
        Some(user) if user.role == "admin" => Ok(()),
        Some(_) => Err(error(StatusCode::FORBIDDEN, "Admin only")),
        None => Err(unauthorized()),
    }
}

// ----- auth ------------------------------------------------------------------

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

fn issue_token(data: &mut BackendData, user: &MockUser) -> Value {
    let token = data.next_id("tok-");
    data.tokens.insert(token.clone(), user.id.clone());
    json!({ "token": token, "user": user.to_json() })
}

async fn login(State(data): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut data = data.lock().unwrap();
    let Some(user) = data
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    Json(issue_token(&mut data, &user)).into_response()
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    password: String,
}

async fn register(State(data): State<Shared>, Json(body): Json<Registration>) -> Response {
    let mut data = data.lock().unwrap();
    if data.users.iter().any(|u| u.email == body.email) {
        return error(StatusCode::CONFLICT, "Email is already registered");
    }
    let user = MockUser {
        id: data.next_id("u"),
        name: body.name,
        email: body.email,
        password: body.password,
        role: "customer",
    };
    data.users.push(user.clone());
    (StatusCode::CREATED, Json(issue_token(&mut data, &user))).into_response()
}

async fn me(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.lock().unwrap();
    match data.user_for_token(&headers) {
        Some(user) => Json(user.to_json()).into_response(),
        None => unauthorized(),
    }
}

async fn logout(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = data.lock().unwrap();
    if let Some(token) = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        data.tokens.remove(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

// ----- catalog ---------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    include_inactive: Option<bool>,
}

fn page_of(items: Vec<Value>, page: u32, limit: u32) -> Value {
    let total = items.len();
    let page = page.max(1);
    let limit = limit.max(1);
    let items: Vec<Value> = items
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();
    json!({ "items": items, "total": total, "page": page, "limit": limit })
}

async fn list_products(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let data = data.lock().unwrap();
    let include_inactive = query.include_inactive.unwrap_or(false);
    if include_inactive && let Err(response) = require_admin(&data, &headers) {
        return response;
    }

    let search = query.search.as_deref().map(str::to_lowercase);
    let items = data
        .products
        .iter()
        .filter(|p| include_inactive || p.is_active)
        .filter(|p| {
            search
                .as_deref()
                .is_none_or(|s| p.name.to_lowercase().contains(s))
        })
        .filter(|p| query.brand.is_none() || p.brand_id == query.brand)
        .filter(|p| query.category.is_none() || p.category_id == query.category)
        .map(|p| data.product_json(p))
        .collect();

    Json(page_of(items, query.page.unwrap_or(1), query.limit.unwrap_or(12))).into_response()
}

async fn get_product(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let data = data.lock().unwrap();
    match data.products.iter().find(|p| p.id == id) {
        Some(p) => Json(data.product_json(p)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: String,
    price: Value,
    stock: u32,
    brand_id: Option<String>,
    category_id: Option<String>,
    is_active: bool,
}

fn price_string(price: &Value) -> String {
    match price {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn create_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut data = data.lock().unwrap();
    if let Err(response) = require_admin(&data, &headers) {
        return response;
    }
    if data.products.iter().any(|p| p.name == body.name) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "Validation failed",
                "errors": [{ "field": "name", "message": "Name is already taken" }],
            })),
        )
            .into_response();
    }
    let product = MockProduct {
        id: data.next_id("p"),
        name: body.name,
        price: price_string(&body.price),
        stock: body.stock,
        brand_id: body.brand_id,
        category_id: body.category_id,
        is_active: body.is_active,
    };
    let json = data.product_json(&product);
    data.products.push(product);
    (StatusCode::CREATED, Json(json)).into_response()
}

async fn update_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ProductBody>,
) -> Response {
    let mut data = data.lock().unwrap();
    if let Err(response) = require_admin(&data, &headers) {
        return response;
    }
    let Some(index) = data.products.iter().position(|p| p.id == id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let product = MockProduct {
        id,
        name: body.name,
        price: price_string(&body.price),
        stock: body.stock,
        brand_id: body.brand_id,
        category_id: body.category_id,
        is_active: body.is_active,
    };
    let json = data.product_json(&product);
    if let Some(slot) = data.products.get_mut(index) {
        *slot = product;
    }
    Json(json).into_response()
}

async fn delete_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = data.lock().unwrap();
    if let Err(response) = require_admin(&data, &headers) {
        return response;
    }
    data.products.retain(|p| p.id != id);
    StatusCode::NO_CONTENT.into_response()
}

fn brand_json(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "slug": name.to_lowercase() })
}

fn category_json(id: &str, name: &str, parent: Option<&String>) -> Value {
    json!({ "id": id, "name": name, "slug": name.to_lowercase(), "parentId": parent })
}

async fn list_brands(State(data): State<Shared>) -> Response {
    let data = data.lock().unwrap();
    let brands: Vec<Value> = data
        .brands
        .iter()
        .map(|(id, name)| brand_json(id, name))
        .collect();
    Json(brands).into_response()
}

async fn get_brand(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let data = data.lock().unwrap();
    match data.brands.iter().find(|(b, _)| *b == id) {
        Some((id, name)) => Json(brand_json(id, name)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Brand not found"),
    }
}

async fn list_categories(State(data): State<Shared>) -> Response {
    let data = data.lock().unwrap();
    let categories: Vec<Value> = data
        .categories
        .iter()
        .map(|(id, name, parent)| category_json(id, name, parent.as_ref()))
        .collect();
    Json(categories).into_response()
}

async fn get_category(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let data = data.lock().unwrap();
    match data.categories.iter().find(|(c, _, _)| *c == id) {
        Some((id, name, parent)) => Json(category_json(id, name, parent.as_ref())).into_response(),
        None => error(StatusCode::NOT_FOUND, "Category not found"),
    }
}

// ----- cart ------------------------------------------------------------------

/// Cart key for the caller: a signed-in user or a guest session id.
fn cart_key(data: &BackendData, headers: &HeaderMap) -> Result<String, Response> {
    if headers.contains_key("authorization") {
        return data
            .user_for_token(headers)
            .map(|u| format!("user:{}", u.id))
            .ok_or_else(unauthorized);
    }
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| format!("guest:{s}"))
        .ok_or_else(unauthorized)
}

async fn get_cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.lock().unwrap();
    match cart_key(&data, &headers) {
        Ok(key) => Json(data.cart_json(&key)).into_response(),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Line {
    product_id: String,
    quantity: u32,
}

#[derive(Deserialize)]
struct ReplaceBody {
    items: Vec<Line>,
}

async fn replace_cart(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ReplaceBody>,
) -> Response {
    let mut data = data.lock().unwrap();
    let key = match cart_key(&data, &headers) {
        Ok(key) => key,
        Err(response) => return response,
    };
    data.replace_cart_calls += 1;
    let lines = body
        .items
        .into_iter()
        .map(|l| (l.product_id, l.quantity))
        .collect();
    data.carts.insert(key.clone(), lines);
    Json(data.cart_json(&key)).into_response()
}

async fn clear_cart(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let mut data = data.lock().unwrap();
    let key = match cart_key(&data, &headers) {
        Ok(key) => key,
        Err(response) => return response,
    };
    data.carts.remove(&key);
    Json(data.cart_json(&key)).into_response()
}

async fn add_item(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Line>,
) -> Response {
    let mut data = data.lock().unwrap();
    let key = match cart_key(&data, &headers) {
        Ok(key) => key,
        Err(response) => return response,
    };
    let Some(stock) = data
        .products
        .iter()
        .find(|p| p.id == body.product_id && p.is_active)
        .map(|p| p.stock)
    else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };

    let lines = data.carts.entry(key.clone()).or_default();
    match lines.iter_mut().find(|(id, _)| *id == body.product_id) {
        Some((_, quantity)) => *quantity = (*quantity + body.quantity).min(stock),
        None => lines.push((body.product_id, body.quantity.min(stock))),
    }
    Json(data.cart_json(&key)).into_response()
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn set_quantity(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<QuantityBody>,
) -> Response {
    let mut data = data.lock().unwrap();
    let key = match cart_key(&data, &headers) {
        Ok(key) => key,
        Err(response) => return response,
    };
    let lines = data.carts.entry(key.clone()).or_default();
    match lines.iter_mut().find(|(line, _)| *line == id) {
        Some((_, quantity)) => *quantity = body.quantity,
        None => return error(StatusCode::NOT_FOUND, "Cart item not found"),
    }
    Json(data.cart_json(&key)).into_response()
}

async fn remove_item(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = data.lock().unwrap();
    let key = match cart_key(&data, &headers) {
        Ok(key) => key,
        Err(response) => return response,
    };
    if let Some(lines) = data.carts.get_mut(&key) {
        lines.retain(|(line, _)| *line != id);
    }
    Json(data.cart_json(&key)).into_response()
}

// ----- users -----------------------------------------------------------------

async fn list_users(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let data = data.lock().unwrap();
    if let Err(response) = require_admin(&data, &headers) {
        return response;
    }
    let users = data.users.iter().map(MockUser::to_json).collect();
    Json(page_of(users, query.page.unwrap_or(1), query.limit.unwrap_or(20))).into_response()
}

async fn get_user(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let data = data.lock().unwrap();
    if let Err(response) = require_admin(&data, &headers) {
        return response;
    }
    match data.users.iter().find(|u| u.id == id) {
        Some(user) => Json(user.to_json()).into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}
