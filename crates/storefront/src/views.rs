//! Display models for templates.
//!
//! Backend records are converted into flat view structs with prices already
//! formatted, so templates only print strings.

use axum::{extract::FromRequestParts, http::request::Parts};
use rust_decimal::Decimal;
use tower_sessions::Session;

use emporium_core::{Brand, Cart, CartItem, Category, CurrencyCode, Page, Price, Product};

use crate::forms::cart::MAX_LINE_QUANTITY;
use crate::middleware::CspNonce;
use crate::models::{CurrentUser, session_keys};
use crate::services::cart_session;
use crate::state::AppState;

fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

// =============================================================================
// Layout
// =============================================================================

/// Data every full page needs: who is signed in, the cart badge and the CSP
/// nonce.
#[derive(Debug, Clone)]
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub nonce: String,
}

impl Layout {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Build the layout for a visitor's session.
    pub async fn load(state: &AppState, session: Option<&Session>, nonce: String) -> Self {
        let Some(session) = session else {
            return Self {
                user: None,
                cart_count: 0,
                nonce,
            };
        };

        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();

        // The badge is decoration; a backend hiccup shows zero.
        let cart_count = match cart_session::current_cart(state.api(), session).await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::debug!(error = %e, "Cart count unavailable");
                0
            }
        };

        Self {
            user,
            cart_count,
            nonce,
        }
    }
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.value().to_string())
            .unwrap_or_default();
        let session = parts.extensions.get::<Session>().cloned();

        Ok(Self::load(state, session.as_ref(), nonce).await)
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub stock: u32,
    pub in_stock: bool,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub brand_id: Option<String>,
    pub brand_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub is_active: bool,
    /// Largest quantity the add-to-cart input offers.
    pub max_quantity: u32,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: money(product.price, currency),
            compare_at_price: product
                .compare_at_price
                .filter(|_| product.on_sale())
                .map(|c| money(c, currency)),
            stock: product.stock,
            in_stock: product.in_stock(),
            image: product.featured_image().map(String::from),
            images: product.images.clone(),
            brand_id: product.brand.as_ref().map(|b| b.id.to_string()),
            brand_name: product.brand.as_ref().map(|b| b.name.clone()),
            category_id: product.category.as_ref().map(|c| c.id.to_string()),
            category_name: product.category.as_ref().map(|c| c.name.clone()),
            is_active: product.is_active,
            max_quantity: product.stock.clamp(1, MAX_LINE_QUANTITY),
        }
    }

    #[must_use]
    pub fn list(products: &[Product], currency: CurrencyCode) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, currency)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct BrandView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo_url: Option<String>,
    pub product_count: Option<u32>,
}

impl From<&Brand> for BrandView {
    fn from(brand: &Brand) -> Self {
        Self {
            id: brand.id.to_string(),
            name: brand.name.clone(),
            slug: brand.slug.clone(),
            description: brand.description.clone().unwrap_or_default(),
            logo_url: brand.logo_url.clone(),
            product_count: brand.product_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<String>,
    pub product_count: Option<u32>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            parent_id: category.parent_id.as_ref().map(ToString::to_string),
            product_count: category.product_count,
        }
    }
}

/// An `<option>` in a filter or form dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }

    /// Options for `items`, selecting the one whose value equals `current`.
    #[must_use]
    pub fn list<'a, I>(items: I, current: Option<&str>) -> Vec<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        items
            .into_iter()
            .map(|(value, label)| Self::new(value, label, current == Some(value)))
            .collect()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Previous/next links for a listing.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    /// Build links to `base` carrying `params` plus the page number.
    #[must_use]
    pub fn new<T>(page: &Page<T>, base: &str, params: &[(&str, String)]) -> Self {
        let link = |n: u32| {
            let mut query: Vec<String> = params
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            query.push(format!("page={n}"));
            format!("{base}?{}", query.join("&"))
        };

        Self {
            page: page.page,
            total_pages: page.total_pages(),
            total: page.total,
            prev_url: page.has_prev().then(|| link(page.page - 1)),
            next_url: page.has_next().then(|| link(page.page + 1)),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub max_quantity: u32,
}

impl CartItemView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: money(item.price, currency),
            line_total: money(item.line_total(), currency),
            max_quantity: item
                .stock
                .map_or(MAX_LINE_QUANTITY, |s| s.clamp(item.quantity.max(1), MAX_LINE_QUANTITY)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .filter(|item| item.quantity > 0)
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            subtotal: money(cart.subtotal(), currency),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
