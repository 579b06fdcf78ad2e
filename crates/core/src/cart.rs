//! Shopping cart records and the guest-to-user merge.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartId, ProductId, UserId};

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    /// Units available at the time the cart was read, if the backend says.
    #[serde(default)]
    pub stock: Option<u32>,
}

impl CartItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart owned either by a guest session or by a signed-in user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.quantity == 0)
    }

    /// Quantity of a product currently in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .filter(|item| &item.product_id == product_id)
            .map(|item| item.quantity)
            .sum()
    }
}

/// Product and quantity pair sent to the backend when replacing a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl From<&CartItem> for CartLineInput {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// Result of [`merge_items`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Merged lines, user lines first.
    pub items: Vec<CartItem>,
    /// Guest lines whose product was not in the user cart.
    pub added: usize,
    /// Guest lines folded into an existing user line.
    pub combined: usize,
}

impl MergeOutcome {
    /// Whether the guest cart contributed anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.added > 0 || self.combined > 0
    }

    /// Lines in the shape the backend's replace-cart call expects.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLineInput> {
        self.items.iter().map(CartLineInput::from).collect()
    }
}

/// Fold a guest cart into a user cart.
///
/// Lines are deduplicated by product id and their quantities summed. The user
/// cart's order is kept and guest-only products are appended in guest order.
/// Guest lines with quantity 0 are ignored. When a line the guest cart touched
/// knows the product's stock, its quantity is capped at it, but never below 1
/// so an existing line is not silently dropped. Lines only in the user cart
/// are passed through as the backend holds them.
#[must_use]
pub fn merge_items(user: &[CartItem], guest: &[CartItem]) -> MergeOutcome {
    let mut items: Vec<CartItem> = Vec::with_capacity(user.len() + guest.len());
    let mut index: HashMap<ProductId, usize> = HashMap::with_capacity(user.len() + guest.len());

    // A user cart can itself hold duplicate lines; collapse them first.
    for item in user {
        if let Some(&pos) = index.get(&item.product_id) {
            if let Some(existing) = items.get_mut(pos) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
        } else {
            index.insert(item.product_id.clone(), items.len());
            items.push(item.clone());
        }
    }

    let mut added = 0;
    let mut combined = 0;
    for item in guest.iter().filter(|item| item.quantity > 0) {
        if let Some(&pos) = index.get(&item.product_id) {
            if let Some(existing) = items.get_mut(pos) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                if existing.stock.is_none() {
                    existing.stock = item.stock;
                }
                cap_at_stock(existing);
                combined += 1;
            }
        } else {
            index.insert(item.product_id.clone(), items.len());
            let mut line = item.clone();
            cap_at_stock(&mut line);
            items.push(line);
            added += 1;
        }
    }

    MergeOutcome {
        items,
        added,
        combined,
    }
}

fn cap_at_stock(item: &mut CartItem) {
    if let Some(stock) = item.stock {
        item.quantity = item.quantity.min(stock.max(1));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::new(1000, 2),
            quantity,
            image: None,
            stock: None,
        }
    }

    fn quantities(outcome: &MergeOutcome) -> Vec<(&str, u32)> {
        outcome
            .items
            .iter()
            .map(|i| (i.product_id.as_str(), i.quantity))
            .collect()
    }

    #[test]
    fn test_merge_sums_duplicates_and_appends_new() {
        let user = vec![item("a", 1), item("b", 2)];
        let guest = vec![item("c", 1), item("a", 3)];

        let outcome = merge_items(&user, &guest);

        assert_eq!(quantities(&outcome), vec![("a", 4), ("b", 2), ("c", 1)]);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.combined, 1);
        assert!(outcome.changed());
    }

    #[test]
    fn test_merge_into_empty_user_cart() {
        let guest = vec![item("x", 2), item("y", 1)];
        let outcome = merge_items(&[], &guest);
        assert_eq!(quantities(&outcome), vec![("x", 2), ("y", 1)]);
        assert_eq!(outcome.added, 2);
    }

    #[test]
    fn test_merge_with_empty_guest_cart_is_unchanged() {
        let user = vec![item("a", 1)];
        let outcome = merge_items(&user, &[]);
        assert_eq!(quantities(&outcome), vec![("a", 1)]);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_merge_skips_zero_quantity_guest_lines() {
        let outcome = merge_items(&[item("a", 1)], &[item("b", 0), item("a", 0)]);
        assert_eq!(quantities(&outcome), vec![("a", 1)]);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_merge_collapses_duplicate_guest_lines() {
        let outcome = merge_items(&[], &[item("a", 1), item("a", 2)]);
        assert_eq!(quantities(&outcome), vec![("a", 3)]);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.combined, 1);
    }

    #[test]
    fn test_merge_caps_at_stock() {
        let mut user_line = item("a", 3);
        user_line.stock = Some(4);
        let outcome = merge_items(&[user_line], &[item("a", 5)]);
        assert_eq!(quantities(&outcome), vec![("a", 4)]);

        let mut sold_out = item("b", 2);
        sold_out.stock = Some(0);
        let outcome = merge_items(&[], &[sold_out]);
        assert_eq!(quantities(&outcome), vec![("b", 1)]);
    }

    #[test]
    fn test_merge_leaves_untouched_user_lines_alone() {
        let mut over_stock = item("a", 6);
        over_stock.stock = Some(2);
        let outcome = merge_items(&[over_stock], &[item("b", 1)]);
        assert_eq!(quantities(&outcome), vec![("a", 6), ("b", 1)]);
    }

    #[test]
    fn test_merge_lines_for_backend() {
        let outcome = merge_items(&[item("a", 1)], &[item("a", 1)]);
        assert_eq!(
            outcome.lines(),
            vec![CartLineInput {
                product_id: ProductId::new("a"),
                quantity: 2
            }]
        );
    }

    #[test]
    fn test_cart_totals() {
        let cart = Cart {
            items: vec![item("a", 2), item("b", 1)],
            ..Cart::default()
        };
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Decimal::new(3000, 2));
        assert_eq!(cart.quantity_of(&ProductId::new("a")), 2);
        assert!(!cart.is_empty());
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_cart_deserializes_backend_shape() {
        let json = r#"{"id":"c1","userId":"u1","items":[
            {"productId":"p1","name":"Lamp","price":12.5,"quantity":2,"stock":7}
        ]}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.user_id.unwrap().as_str(), "u1");
        assert_eq!(cart.items.first().unwrap().stock, Some(7));
    }
}
