//! Cart operations for guests and signed-in users.

use std::fmt;

use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, instrument};

use emporium_core::{Cart, CartLineInput, ProductId, SessionToken, UserId};

use super::{ApiClient, ApiError, CartKey, Credentials, segment};

/// Whose cart a request operates on.
#[derive(Clone)]
pub enum CartOwner {
    /// Signed-in user, authenticated with their bearer token.
    User { id: UserId, token: SecretString },
    /// Anonymous visitor, identified by the guest session id.
    Guest(SessionToken),
}

impl CartOwner {
    /// Cache key for this owner's cart.
    #[must_use]
    pub fn key(&self) -> CartKey {
        match self {
            Self::User { id, .. } => CartKey::User(id.clone()),
            Self::Guest(token) => CartKey::Guest(token.clone()),
        }
    }

    fn credentials(&self) -> Credentials<'_> {
        match self {
            Self::User { token, .. } => Credentials::Bearer(token),
            Self::Guest(session) => Credentials::Session(session),
        }
    }
}

impl fmt::Debug for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { id, .. } => f.debug_struct("User").field("id", id).finish_non_exhaustive(),
            Self::Guest(token) => f.debug_tuple("Guest").field(&token.as_str()).finish(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

impl ApiClient {
    /// Fetch the owner's cart.
    #[instrument(skip(self), fields(owner = ?owner.key()))]
    pub async fn get_cart(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        let key = owner.key();
        if let Some(cart) = self.inner.carts.get(&key).await {
            debug!("Cart cache hit");
            return Ok(cart);
        }
        self.fetch_cart(owner).await
    }

    /// Fetch the owner's cart from the backend, skipping the cache. The
    /// response still refreshes the cached entry.
    #[instrument(skip(self), fields(owner = ?owner.key()))]
    pub async fn fetch_cart(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        let builder = self.request(Method::GET, "cart", owner.credentials())?;
        let cart: Cart = self.send(builder, "cart").await?;
        Ok(self.remember_cart(owner, cart).await)
    }

    /// Add units of a product to the cart.
    #[instrument(skip(self), fields(owner = ?owner.key(), product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        owner: &CartOwner,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let builder = self
            .request(Method::POST, "cart/items", owner.credentials())?
            .json(&AddItemBody {
                product_id,
                quantity,
            });
        let cart = self.send(builder, &format!("product {product_id}")).await?;
        Ok(self.remember_cart(owner, cart).await)
    }

    /// Set a line's quantity. Zero removes the line.
    #[instrument(skip(self), fields(owner = ?owner.key(), product_id = %product_id))]
    pub async fn set_cart_quantity(
        &self,
        owner: &CartOwner,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        if quantity == 0 {
            return self.remove_from_cart(owner, product_id).await;
        }

        let path = format!("cart/items/{}", segment(product_id.as_str()));
        let builder = self
            .request(Method::PATCH, &path, owner.credentials())?
            .json(&json!({ "quantity": quantity }));
        let cart = self.send(builder, &format!("cart item {product_id}")).await?;
        Ok(self.remember_cart(owner, cart).await)
    }

    #[instrument(skip(self), fields(owner = ?owner.key(), product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        owner: &CartOwner,
        product_id: &ProductId,
    ) -> Result<Cart, ApiError> {
        let path = format!("cart/items/{}", segment(product_id.as_str()));
        let builder = self.request(Method::DELETE, &path, owner.credentials())?;
        let cart = self.send(builder, &format!("cart item {product_id}")).await?;
        Ok(self.remember_cart(owner, cart).await)
    }

    #[instrument(skip(self), fields(owner = ?owner.key()))]
    pub async fn clear_cart(&self, owner: &CartOwner) -> Result<Cart, ApiError> {
        let builder = self.request(Method::DELETE, "cart", owner.credentials())?;
        let cart = self.send(builder, "cart").await?;
        Ok(self.remember_cart(owner, cart).await)
    }

    /// Replace a user's cart lines in one request.
    #[instrument(skip(self, token, lines), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn replace_cart(
        &self,
        user_id: &UserId,
        token: &SecretString,
        lines: &[CartLineInput],
    ) -> Result<Cart, ApiError> {
        let builder = self
            .request(Method::PUT, "cart", Credentials::Bearer(token))?
            .json(&json!({ "items": lines }));
        let cart: Cart = self.send(builder, "cart").await?;

        self.inner
            .carts
            .insert(CartKey::User(user_id.clone()), cart.clone())
            .await;
        Ok(cart)
    }

    /// Forget cached carts for the given owners.
    pub async fn invalidate_carts(&self, keys: &[CartKey]) {
        for key in keys {
            self.inner.carts.invalidate(key).await;
        }
    }

    async fn remember_cart(&self, owner: &CartOwner, cart: Cart) -> Cart {
        self.inner.carts.insert(owner.key(), cart.clone()).await;
        cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_key_excludes_token() {
        let a = CartOwner::User {
            id: UserId::new("u1"),
            token: SecretString::from("one"),
        };
        let b = CartOwner::User {
            id: UserId::new("u1"),
            token: SecretString::from("two"),
        };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_owner_debug_redacts_token() {
        let owner = CartOwner::User {
            id: UserId::new("u1"),
            token: SecretString::from("secret-token"),
        };
        let debug = format!("{owner:?}");
        assert!(debug.contains("u1"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_add_item_body_shape() {
        let id = ProductId::new("p1");
        let body = serde_json::to_value(AddItemBody {
            product_id: &id,
            quantity: 2,
        })
        .unwrap();
        assert_eq!(body, json!({"productId": "p1", "quantity": 2}));
    }
}
